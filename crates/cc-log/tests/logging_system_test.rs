//! Black-box integration tests for `cc_log`'s public macros and config API.

use cc_log::prelude::*;
use cc_log::LogConfig;

#[test]
fn vlog_respects_module_specific_override() {
    let config = LogConfig::global();
    let original = config.get_global_vlog_level();
    config.set_vlog_level(0);
    config.set_module_vlog_level("cc_log_tests", 2);

    assert!(vlog_is_on!(1));
    assert!(vlog_is_on!(2));
    assert!(!vlog_is_on!(3));

    config.clear_vmodule();
    config.set_vlog_level(original);
}

#[test]
fn parse_vmodule_feeds_is_vlog_enabled() {
    let config = LogConfig::new();
    config.parse_vmodule("parser=3,decoder=1");
    assert!(config.is_vlog_enabled(3, "codec::parser"));
    assert!(!config.is_vlog_enabled(2, "codec::decoder"));
}

#[test]
fn check_macros_pass_silently_on_true_conditions() {
    check!(1 + 1 == 2);
    check_eq!(2 + 2, 4);
    check_ne!(1, 2);
    check_lt!(1, 2);
    check_le!(2, 2);
    check_gt!(2, 1);
    check_ge!(2, 2);
    check_streq!("a", "a");
    check_some!(Some(1));
    check_ok!(Ok::<_, &str>(1));
}

#[test]
#[should_panic(expected = "Check failed")]
fn check_eq_panics_with_both_values_on_mismatch() {
    check_eq!(2 + 2, 5);
}

#[test]
fn rate_limited_macros_compile_and_run_without_panicking() {
    for i in 0..10u32 {
        log_every_n!(trace, 3, "iteration {}", i);
        log_first_n!(trace, 2, "iteration {}", i);
        log_if!(trace, i % 2 == 0, "even iteration {}", i);
        log_if_every_n!(trace, true, 5, "iteration {}", i);
    }
}

#[test]
fn init_from_env_reads_vlog_level_variable() {
    std::env::set_var("VLOG_LEVEL", "4");
    std::env::set_var("VLOG_MODULE", "router=1");
    init_from_env();
    let config = LogConfig::global();
    assert_eq!(config.get_global_vlog_level(), 4);
    assert_eq!(config.get_vlog_level("router"), 1);
    std::env::remove_var("VLOG_LEVEL");
    std::env::remove_var("VLOG_MODULE");
    config.set_vlog_level(0);
    config.clear_vmodule();
}
