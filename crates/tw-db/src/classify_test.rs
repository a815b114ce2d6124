use super::*;

#[test]
fn test_mysql_numbers() {
    assert_eq!(
        classify(Some("1050"), "Table 't' already exists"),
        ErrorClass::AlreadyExists(AlreadyExistsKind::TableExists)
    );
    assert_eq!(
        classify(Some("1061"), "Duplicate key name 'idx_parent_id'"),
        ErrorClass::AlreadyExists(AlreadyExistsKind::DuplicateKeyName)
    );
    assert_eq!(
        classify(Some("1062"), "Duplicate entry '1' for key 'PRIMARY'"),
        ErrorClass::AlreadyExists(AlreadyExistsKind::DuplicateEntry)
    );
    assert_eq!(
        classify(Some("1060"), "Duplicate column name 'parent_id'"),
        ErrorClass::AlreadyExists(AlreadyExistsKind::DuplicateColumn)
    );
}

#[test]
fn test_symbolic_codes() {
    assert_eq!(
        classify(Some("ER_DUP_KEYNAME"), "Duplicate key name"),
        ErrorClass::AlreadyExists(AlreadyExistsKind::DuplicateKeyName)
    );
    assert_eq!(
        classify(Some("42S01"), ""),
        ErrorClass::AlreadyExists(AlreadyExistsKind::TableExists)
    );
}

#[test]
fn test_message_fallback_is_case_insensitive() {
    assert_eq!(
        classify(None, "Catalog Error: Table with name t Already Exists!"),
        ErrorClass::AlreadyExists(AlreadyExistsKind::Message)
    );
}

#[test]
fn test_unknown_code_with_matching_message() {
    assert!(classify(Some("1826"), "Duplicate foreign key constraint name; already exists")
        .is_already_exists());
}

#[test]
fn test_unclassified_errors() {
    assert_eq!(
        classify(Some("1146"), "Table 'cms_db.missing' doesn't exist"),
        ErrorClass::Other
    );
    assert_eq!(
        classify(Some("1064"), "You have an error in your SQL syntax"),
        ErrorClass::Other
    );
    assert_eq!(classify(None, "Binder Error: column not found"), ErrorClass::Other);
}

#[test]
fn test_db_error_class() {
    use crate::DbError;

    let err = DbError::ExecutionError {
        code: Some("1061".to_string()),
        message: "Duplicate key name 'idx'".to_string(),
    };
    assert!(err.class().is_already_exists());
    assert_eq!(err.code(), Some("1061"));
    assert_eq!(
        err.to_string(),
        "[D002] SQL execution failed (1061): Duplicate key name 'idx'"
    );

    let conn = DbError::ConnectionError("already exists".to_string());
    assert_eq!(conn.class(), ErrorClass::Other);
}
