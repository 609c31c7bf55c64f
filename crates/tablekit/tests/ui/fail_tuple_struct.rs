use tablekit::model;

#[model]
pub struct User(i64);

fn main() {}
