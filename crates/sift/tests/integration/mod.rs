mod indexing;
mod lifecycle;
mod search;
