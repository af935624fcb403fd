//! Shell command regression test
//!
//! Run with:
//! ```
//! cargo test -p roistat-plugin --test shell_reg
//! ```

use roistat_plugin::shell::{CONFIGURE_ARGS, CONFIGURE_COMMAND};
use roistat_plugin::{CommandRegistry, Param, PluginError, register_roistat_commands};

fn registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    register_roistat_commands(&mut registry);
    registry
}

#[test]
fn shell_reg_configure() {
    let mut registry = registry();
    let def = registry.command(CONFIGURE_COMMAND).unwrap();
    assert_eq!(def.args.len(), 10);
    assert_eq!(def.args, &CONFIGURE_ARGS);

    registry
        .invoke(
            CONFIGURE_COMMAND,
            &["ROI1", "20", "1", "SIM1", "0", "4", "-1", "-1", "0", "0"],
        )
        .unwrap();

    let driver = registry.ports().get("ROI1").unwrap();
    assert_eq!(driver.config().effective_max_rois(), 4);
    assert!(driver.config().blocking_callbacks);
    assert_eq!(driver.read_octet(0, Param::ArrayPort).unwrap(), "SIM1");
    assert_eq!(driver.read_int32(0, Param::QueueSize).unwrap(), 20);
    assert_eq!(
        driver.read_octet(0, Param::PluginType).unwrap(),
        "NDPluginROIStat"
    );
    assert!(driver.read_int32(3, Param::Use).is_ok());
    assert!(driver.read_int32(4, Param::Use).is_err());
}

#[test]
fn shell_reg_defaults_and_minimum_rois() {
    let mut registry = registry();
    registry
        .run_line("NDROIStatConfigure(\"ROI2\", 5, 0, \"SIM1\", 0, 0)")
        .unwrap();
    let driver = registry.ports().get("ROI2").unwrap();
    assert_eq!(driver.config().effective_max_rois(), 1);
    assert_eq!(driver.config().stack_size, 0);
    assert_eq!(driver.config().max_memory, 0);
}

#[test]
fn shell_reg_duplicate_port() {
    let mut registry = registry();
    registry.run_line("NDROIStatConfigure ROI3, 5, 1").unwrap();
    assert!(matches!(
        registry.run_line("NDROIStatConfigure ROI3, 5, 1"),
        Err(PluginError::DuplicatePort(name)) if name == "ROI3"
    ));
    assert_eq!(registry.ports().names(), vec!["ROI3"]);
}

#[test]
fn shell_reg_bad_arguments() {
    let mut registry = registry();
    assert!(matches!(
        registry.invoke(CONFIGURE_COMMAND, &["ROI4", "many"]),
        Err(PluginError::BadArgument { arg: "frame queue size", .. })
    ));
    let too_many = ["x"; 11];
    assert!(matches!(
        registry.invoke(CONFIGURE_COMMAND, &too_many),
        Err(PluginError::ArgumentCount { expected: 10, actual: 11, .. })
    ));
    assert!(matches!(
        registry.invoke(CONFIGURE_COMMAND, &["ROI5", "1", "0", "", "0", "99999999999"]),
        Err(PluginError::BadArgument { arg: "maxROIs", .. })
    ));
    assert!(matches!(
        registry.run_line("NDROIStatConfig ROI6"),
        Err(PluginError::UnknownCommand(_))
    ));
    assert!(registry.ports().is_empty());
}
