use tablekit::{Model, model};

#[model]
pub struct User {
    #[field(sql = "INTEGER PRIMARY KEY AUTOINCREMENT")]
    id: i64,
    #[field(sql = "VARCHAR(30)", default = "")]
    first_name: String,
    #[field(default = -1)]
    age: i32,
    #[field]
    avatar: Option<Vec<u8>>,
    pub cached: bool,
}

#[model]
pub struct Tag;

fn main() {
    let user = User { cached: false };
    assert!(!user.cached);

    assert_eq!(User::fields().len(), 4);
    assert!(Tag::fields().is_empty());
}
