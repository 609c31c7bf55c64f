use tablekit::model;

#[model]
pub struct Event {
    #[field]
    created: std::time::SystemTime,
}

fn main() {}
