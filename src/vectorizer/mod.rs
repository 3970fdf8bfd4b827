pub mod compute;
pub mod corpus;
pub mod document;
pub mod label;
pub mod learning;
pub mod tokenizer;
