use crate::{Environment, testing_harness::with_mock_env};
use std::str::FromStr;

crate::env_var!(
    #[derive(Clone)]
    pub struct SnapshotDirUnderTest;
);

#[test]
fn it_should_derive_the_variable_name_from_the_type_name() {
    assert_eq!(
        SnapshotDirUnderTest::var_name(),
        "SNAPSHOT_DIR_UNDER_TEST"
    );
}

#[test]
fn it_should_read_the_variable_through_the_sentinel() {
    let value = with_mock_env(
        |name| match name {
            "SNAPSHOT_DIR_UNDER_TEST" => Ok("/tmp/docflow-snapshots".to_string()),
            _ => Err(std::env::VarError::NotPresent),
        },
        || SnapshotDirUnderTest::new(),
    )
    .unwrap();

    assert_eq!(value.as_ref(), "/tmp/docflow-snapshots");
}

#[test]
fn it_should_surface_the_variable_name_on_failure() {
    let err = with_mock_env(
        |_| Err(std::env::VarError::NotPresent),
        || SnapshotDirUnderTest::new(),
    )
    .unwrap_err();

    assert!(err.to_string().contains("SNAPSHOT_DIR_UNDER_TEST"));
}

#[test]
fn it_should_parse_environment_strings() {
    assert_eq!(Environment::from_str("prod").unwrap(), Environment::Production);
    assert_eq!(Environment::from_str("dev").unwrap(), Environment::Develop);
    assert_eq!(Environment::from_str("local").unwrap(), Environment::Local);
    assert!(Environment::from_str("staging").is_err());
}

#[test]
fn it_should_round_trip_environment_display() {
    for env in [
        Environment::Production,
        Environment::Develop,
        Environment::Local,
    ] {
        assert_eq!(Environment::from_str(&env.to_string()).unwrap(), env);
    }
}

#[test]
fn it_should_fall_back_to_production_when_the_variable_is_absent() {
    let env = with_mock_env(
        |_| Err(std::env::VarError::NotPresent),
        Environment::new_or_prod,
    );
    assert_eq!(env, Environment::Production);
}

#[test]
fn it_should_pick_up_the_environment_variable() {
    let env = with_mock_env(
        |name| match name {
            "DOCFLOW_ENV" => Ok("local".to_string()),
            _ => Err(std::env::VarError::NotPresent),
        },
        Environment::new_or_prod,
    );
    assert_eq!(env, Environment::Local);
}
