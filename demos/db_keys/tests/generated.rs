//! Behaviour of the generated `Db` companions.

use anyhow::{Context, Result, ensure};
use db_keys::keys::{Db, DbConfig, DbConfigBean, DbConfigBeanError, DbPropertyFileConfigurationResolver};
use rstest::{fixture, rstest};

#[fixture]
fn bean() -> DbConfigBean {
    DbConfigBean::from_values([
        ("db.url", "postgres://localhost/app"),
        ("db.pool_size", "16"),
        ("db.timeout", "soon"),
    ])
}

#[rstest]
fn default_handle_selects_the_default_key() {
    assert_eq!(*DbConfig::default().key(), Db::PoolSize);
    assert_eq!(Db::CONFIGURATION_KEYS, [Db::Url, Db::PoolSize, Db::Timeout, Db::Unset]);
}

#[rstest]
#[case(Db::Url, "db.url")]
#[case(Db::PoolSize, "db.pool_size")]
#[case(Db::Timeout, "db.timeout")]
fn key_strings_come_from_the_marked_method(#[case] key: Db, #[case] expected: &str) {
    assert_eq!(DbConfig::from(key).key_string(), expected);
}

#[rstest]
fn values_are_looked_up_by_key_string(bean: DbConfigBean) -> Result<()> {
    let url = bean.value(&DbConfig::new(Db::Url))?;
    ensure!(url.as_deref() == Some("postgres://localhost/app"));
    ensure!(bean.i32_value(&DbConfig::default())? == Some(16));
    ensure!(bean.raw("db.pool_size") == Some("16"));
    Ok(())
}

#[rstest]
fn null_key_yields_nothing(bean: DbConfigBean) -> Result<()> {
    let unset = DbConfig::new(Db::Unset);
    ensure!(unset.is_null());
    ensure!(bean.value(&unset)?.is_none());
    ensure!(!DbConfig::default().is_null());
    Ok(())
}

#[rstest]
fn validator_rejects_values(bean: DbConfigBean) -> Result<()> {
    let err = bean
        .value(&DbConfig::new(Db::Timeout))
        .err()
        .context("non-numeric timeout should be rejected")?;
    ensure!(
        err == DbConfigBeanError::Invalid {
            key: "db.timeout".to_owned(),
            value: "soon".to_owned(),
        }
    );
    ensure!(err.to_string() == "invalid value \"soon\" for configuration key db.timeout");
    Ok(())
}

#[rstest]
fn producers_report_parse_failures() -> Result<()> {
    let values = DbConfigBean::from_values([("db.url", "yes")]);
    let err = values
        .bool_value(&DbConfig::new(Db::Url))
        .err()
        .context("`yes` is not a bool")?;
    ensure!(matches!(err, DbConfigBeanError::Parse { target: "bool", .. }));
    ensure!(values.i64_value(&DbConfig::new(Db::Timeout))?.is_none());
    Ok(())
}

#[rstest]
fn resolver_parses_property_files() -> Result<()> {
    ensure!(DbPropertyFileConfigurationResolver::DEFAULT_PATH == "/etc/db_keys/db.properties");
    ensure!(DbPropertyFileConfigurationResolver::PATH_VARIABLE == "Db_PROPERTIES");

    let parsed = DbPropertyFileConfigurationResolver::parse(
        "# database\n\ndb.url = postgres://db/app\n! legacy\ndb.pool_size: 4\nflag\n",
    );
    ensure!(parsed.len() == 3, "{parsed:?}");
    ensure!(parsed.get("db.url").map(String::as_str) == Some("postgres://db/app"));
    ensure!(parsed.get("flag").map(String::as_str) == Some(""));

    let values = DbConfigBean::from_values(parsed);
    ensure!(values.i32_value(&DbConfig::default())? == Some(4));
    Ok(())
}
