use crate::{
    db::Db,
    dialect::Dialect,
    driver::DriverError,
    error::{BindError, Error, ErrorClass, LookupError, ShapeError},
    params,
    test_support::{
        MockDriver,
        records::{Address, Customer, User},
    },
    value::{Value, ValueError},
};

fn user_db() -> (MockDriver, Db) {
    let driver = MockDriver::new();
    let mut db = Db::new(driver.clone(), Dialect::sqlite());
    db.register::<User>("users").unwrap();

    (driver, db)
}

fn user_row(id: i64, name: &str) -> Vec<Value> {
    vec![Value::Int(id), Value::from(name), Value::Int(1)]
}

#[test]
fn record_destination_maps_only_the_first_row() {
    let (driver, db) = user_db();
    driver.queue(
        &["id", "name", "active"],
        vec![user_row(1, "a"), user_row(2, "b"), user_row(3, "c")],
    );

    let mut user = User::default();
    let mapped = db
        .prepare("SELECT id, name, active FROM users")
        .unwrap()
        .query(&mut user, ())
        .unwrap();

    assert_eq!(mapped, 1);
    assert_eq!(user.id, 1);
    assert_eq!(user.name, "a");
    assert!(user.active);

    let state = driver.state();
    assert_eq!(state.rows_fetched, 1, "remaining rows must stay unvisited");
    assert_eq!(state.cursors_opened, state.cursors_closed);
}

#[test]
fn record_destination_reports_no_row() {
    let (driver, db) = user_db();
    driver.queue(&["id"], Vec::new());

    let mut user = User {
        name: "kept".into(),
        ..User::default()
    };
    let mapped = db.select_by_id(&mut user, 9).unwrap();

    assert_eq!(mapped, 0);
    assert_eq!(user.name, "kept");
    assert_eq!(driver.last_execution().unwrap().values, [Value::Int(9)]);
}

#[test]
fn collection_destination_maps_every_row() {
    let (driver, db) = user_db();
    driver.queue(
        &["id", "name", "active"],
        vec![user_row(1, "a"), user_row(2, "b")],
    );

    let mut users = vec![User::default(); 5];
    let mapped = db.select_all(&mut users).unwrap();

    assert_eq!(mapped, 2);
    assert_eq!(users.len(), 2);
    assert_eq!(users[1].name, "b");
}

#[test]
fn collection_is_emptied_when_a_row_fails() {
    let (driver, db) = user_db();
    driver.queue(
        &["id", "name", "active"],
        vec![
            user_row(1, "a"),
            vec![Value::Int(2), Value::Int(5), Value::Int(0)],
        ],
    );

    let mut users = vec![User::default()];
    let err = db.select_all(&mut users).unwrap_err();

    assert!(matches!(
        err,
        Error::Shape(ShapeError::Convert { ref column, source: ValueError::TypeMismatch { .. } })
            if column == "name"
    ));
    assert!(users.is_empty());
    assert_eq!(driver.state().cursors_closed, 1);
}

#[test]
fn unmapped_column_is_rejected_before_rows_are_read() {
    let (driver, db) = user_db();
    driver.queue(&["id", "nickname"], vec![vec![Value::Int(1), Value::from("x")]]);

    let mut user = User::default();
    let err = db
        .prepare("SELECT id, nickname FROM users")
        .unwrap()
        .query(&mut user, ())
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Shape(ShapeError::UnmappedColumn { ref column, .. }) if column == "nickname"
    ));
    assert_eq!(driver.state().rows_fetched, 0);
    assert_eq!(user, User::default());
}

#[test]
fn scalar_destination_reads_one_column() {
    let (driver, db) = user_db();
    driver.queue(&["count"], vec![vec![Value::Int(12)], vec![Value::Int(99)]]);

    let mut count = 0i64;
    let mapped = db
        .prepare("SELECT COUNT(*) AS count FROM users WHERE active = :active")
        .unwrap()
        .query(&mut count, true)
        .unwrap();

    assert_eq!((mapped, count), (1, 12));
    assert_eq!(driver.last_execution().unwrap().values, [Value::Bool(true)]);
}

#[test]
fn scalar_destination_rejects_wide_results() {
    let (driver, db) = user_db();
    driver.queue(&["a", "b"], vec![vec![Value::Int(1), Value::Int(2)]]);

    let mut value = Value::Null;
    let err = db
        .prepare("SELECT a, b FROM t")
        .unwrap()
        .query(&mut value, ())
        .unwrap_err();

    assert!(matches!(err, Error::Shape(ShapeError::ScalarColumns { found: 2 })));
    assert_eq!(driver.state().cursors_closed, 1);
}

#[test]
fn missing_values_fail_without_executing() {
    let (driver, db) = user_db();

    let mut user = User::default();
    let err = db
        .prepare("SELECT * FROM users WHERE id = :id")
        .unwrap()
        .query(&mut user, ())
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Bind(BindError::MissingValues { expected: 1 })
    ));
    assert!(driver.executions().is_empty());
}

#[test]
fn unregistered_record_destination_fails_before_executing() {
    let (driver, db) = user_db();

    let mut customer = Customer::default();
    let err = db
        .prepare("SELECT * FROM customers")
        .unwrap()
        .query(&mut customer, ())
        .unwrap_err();

    assert_eq!(err.class(), ErrorClass::Lookup);
    assert!(driver.executions().is_empty());
}

#[test]
fn driver_failure_is_an_execution_error() {
    let (driver, db) = user_db();
    driver.fail_execute(DriverError::new("UNIQUE constraint failed").with_code(19));

    let err = db.prepare("DELETE FROM users").unwrap().exec(()).unwrap_err();

    assert_eq!(err.class(), ErrorClass::Execution);
    assert_eq!(err.to_string(), "dbmap: UNIQUE constraint failed");
}

#[test]
fn embedded_columns_map_through_paths() {
    let driver = MockDriver::new();
    let mut db = Db::new(driver.clone(), Dialect::sqlite());
    db.register::<Customer>("customers").unwrap();
    driver.queue(
        &["id", "street", "zip_code"],
        vec![vec![Value::Int(3), Value::from("Main"), Value::Int(1000)]],
    );

    let mut customer = Customer::default();
    db.select_by(&mut customer, "zip_code", 1000).unwrap();

    assert_eq!(customer.id, 3);
    assert_eq!(
        customer.address,
        Address {
            street: "Main".into(),
            zip: 1000,
        }
    );
}

#[test]
fn select_by_needs_a_record_destination() {
    let (_, db) = user_db();

    let mut count = 0i64;
    let err = db.select_by(&mut count, "id", 1).unwrap_err();

    assert!(matches!(
        err,
        Error::Lookup(LookupError::NotRecordDestination { shape: "scalar" })
    ));
}

#[test]
fn select_by_unknown_column_is_a_lookup_error() {
    let (driver, db) = user_db();

    let mut users: Vec<User> = Vec::new();
    let err = db.select_by(&mut users, "email", "x").unwrap_err();

    assert!(matches!(
        err,
        Error::Lookup(LookupError::UnknownColumn { ref column, .. }) if column == "email"
    ));
    assert!(driver.executions().is_empty());
}

#[test]
fn named_params_work_with_queries() {
    let (driver, db) = user_db();
    driver.queue(&["id"], vec![vec![Value::Int(4)]]);

    let mut users: Vec<User> = Vec::new();
    let stmt = db
        .prepare("SELECT id FROM users WHERE name = :name AND active = :active")
        .unwrap();
    stmt.query(&mut users, params! { "name" => "ann", "active" => true })
        .unwrap();

    assert_eq!(users.len(), 1);
    assert_eq!(
        driver.last_execution().unwrap().values,
        [Value::from("ann"), Value::Bool(true)]
    );
}
