use std::sync::Once;
use tablekit::{
    Error, Model,
    config::{self, Config},
    core::error::{ErrorClass, SchemaError},
    model,
    prelude::*,
    values,
};

static SETUP: Once = Once::new();

// every bound handle in this binary gets its own private in-memory database
fn setup() {
    SETUP.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        config::install(Config::in_memory());
    });
}

///
/// User
///

#[model]
pub struct User {
    #[field(sql = "INTEGER PRIMARY KEY AUTOINCREMENT")]
    id: i64,
    #[field(sql = "INTEGER")]
    age: i64,
    #[field(sql = "VARCHAR(30)", default = "")]
    first_name: String,
    #[field(sql = "VARCHAR(30)", default = "")]
    last_name: String,
}

#[test]
fn user_demo() {
    setup();
    let mut users = User::objects().unwrap();

    let john = users
        .insert(&values! { first_name: "John", last_name: "Test", age: 10 })
        .unwrap();
    let john2 = users
        .insert(&values! { first_name: "John", last_name: "Test2", age: 10 })
        .unwrap();
    assert!(john2 > john);

    let rows = users.select(&values! { first_name: "John" }).unwrap();
    let last_names: Vec<_> = rows
        .iter()
        .map(|row| row.get("last_name").and_then(Value::as_text).unwrap())
        .collect();
    assert_eq!(last_names, ["Test", "Test2"]);

    users.save_changes().unwrap();
    assert!(users.is_closed());

    let err = users.insert(&values! { first_name: "Late" }).unwrap_err();
    assert!(err.is_closed());
    drop(users);

    // the handle is per type for the life of the process
    assert!(User::objects().unwrap().is_closed());
}

#[test]
fn schema_holds_fields_in_declaration_order() {
    let schema = User::schema().unwrap();

    assert_eq!(schema.table(), "user");
    assert_eq!(
        schema.names().collect::<Vec<_>>(),
        ["id", "age", "first_name", "last_name"]
    );
    assert_eq!(
        schema.field("first_name").and_then(FieldDescriptor::default),
        Some(&Value::from(""))
    );
    assert_eq!(schema.field("age").map(FieldDescriptor::sql_type), Some("INTEGER"));
}

#[test]
fn field_members_are_moved_out_of_the_type() {
    assert_eq!(std::mem::size_of::<User>(), 0);
    let _unit: User = User;

    assert_eq!(<User as Model>::PATH, concat!(module_path!(), "::User"));
    assert_eq!(User::table_name(), "user");
}

///
/// Session
/// a type that keeps an ordinary member next to its columns
///

#[model]
pub struct Session {
    #[field]
    token: String,
    #[field]
    expires: Option<i64>,
    pub label: &'static str,
}

#[test]
fn non_field_members_pass_through() {
    let session = Session { label: "cli" };
    assert_eq!(session.label, "cli");

    let schema = Session::schema().unwrap();
    let types: Vec<_> = schema.fields().map(|(_, f)| f.sql_type()).collect();
    assert_eq!(types, ["TEXT", "INTEGER"]);
}

///
/// Person
///

#[model]
pub struct Person {
    #[field(sql = "TEXT NOT NULL")]
    first_name: String,
    #[field(sql = "TEXT NOT NULL")]
    last_name: String,
    #[field(sql = "INTEGER", default = 0)]
    age: i64,
}

#[test]
fn update_and_delete_are_selective() {
    setup();
    let mut people = Person::objects().unwrap();

    people.insert(&values! { first_name: "Sam", last_name: "Smith" }).unwrap();
    people.insert(&values! { first_name: "Tom", last_name: "Jones" }).unwrap();
    people
        .insert(&values! { first_name: "Thomas", last_name: "Aquinas", age: 49 })
        .unwrap();

    let updated = people
        .update(&values! { first_name: "Sam" }, &values! { age: 999 })
        .unwrap();
    assert_eq!(updated, 1);
    assert_eq!(people.count(&values! { age: 999 }).unwrap(), 1);
    assert_eq!(people.count(&values! { first_name: "Tom", age: 0 }).unwrap(), 1);

    let deleted = people
        .delete(&values! { first_name: "Thomas", last_name: "Aquinas" })
        .unwrap();
    assert_eq!(deleted, 1);
    assert_eq!(people.count(&Values::new()).unwrap(), 2);

    let err = people.delete(&Values::new()).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Query);

    let err = people.insert(&values! { first_name: "NoLast" }).unwrap_err();
    assert!(matches!(err, Error::Constraint(_)));
}

///
/// Marker
/// declares no columns at all
///

#[model]
pub struct Marker;

#[test]
fn type_without_fields_still_gets_a_handle() {
    setup();
    let mut marker = Marker::objects().unwrap();

    assert!(marker.schema().is_empty());
    assert_eq!(
        marker.insert(&Values::new()).unwrap_err().class(),
        ErrorClass::Engine
    );
}

///
/// Account
/// two types that resolve to the same table name
///

mod billing {
    use tablekit::model;

    #[model]
    pub struct Account {
        #[field]
        balance: i64,
    }
}

mod auth {
    use tablekit::model;

    #[model]
    pub struct Account {
        #[field]
        email: String,
    }
}

#[test]
fn table_name_collision_fails_for_both_types() {
    setup();

    for err in [
        billing::Account::objects().unwrap_err(),
        auth::Account::objects().unwrap_err(),
    ] {
        assert!(
            matches!(
                err,
                Error::Schema(SchemaError::DuplicateTable { ref table, .. }) if table == "account"
            ),
            "{err}"
        );
    }

    assert!(!billing::Account::cell().is_bound());
}

///
/// Invalid names are caught when the type binds
///

#[model]
pub struct Select {
    #[field]
    name: String,
}

#[test]
fn reserved_table_name_is_rejected() {
    setup();

    let err = Select::objects().unwrap_err();

    assert_eq!(err.class(), ErrorClass::Schema);
    assert!(err.to_string().contains("select"));
}

///
/// Ledger
///

#[model]
pub struct Ledger {
    #[field]
    amount: i64,
}

fn ledger_total() -> Result<u64, Error> {
    Ledger::objects()?.count(&Values::new())
}

#[test]
fn second_guard_on_the_same_type_is_refused() {
    setup();
    let mut ledger = Ledger::objects().unwrap();
    ledger.insert(&values! { amount: 5 }).unwrap();

    let err = ledger_total().unwrap_err();
    assert!(err.is_busy(), "{err}");
    assert_eq!(err.class(), ErrorClass::Connection);
    assert!(err.to_string().contains("ledger"));

    // the guard is untouched by the refused call
    assert_eq!(ledger.count(&Values::new()).unwrap(), 1);
    drop(ledger);

    assert_eq!(ledger_total().unwrap(), 1);
}
