use std::{collections::HashMap, env, fmt, fs, io::Write, path::PathBuf};

use serde::Serialize;

mod markdown;
mod validator;
mod value;

pub use validator::Validator;
pub use value::Value;

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Parse errors.
    Parse(String),
    /// Validation errors.
    Validation(String),
}

impl Error {
    /// Convenience function for creating parse errors.
    pub fn parse<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self::Parse(message.into())
    }

    /// Convenience function for creating validation errors.
    pub fn validation<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self::Validation(message.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse(message) => write!(f, "{message}"),
            Error::Validation(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for Error {}

/// A configuration option.
#[derive(Serialize)]
pub struct ConfigOption {
    /// The name of the configuration option.
    ///
    /// The associated environment variable has the format of
    /// `<CRATE>_CONFIG_<NAME>`.
    pub name: &'static str,

    /// The description of the configuration option.
    ///
    /// The description will be included in the generated markdown
    /// documentation.
    pub description: &'static str,

    /// The default value of the configuration option.
    pub default_value: Value,

    /// An optional validator for the configuration option.
    pub constraint: Option<Validator>,
}

impl ConfigOption {
    fn env_var(&self, prefix: &str) -> String {
        format!("{}{}", prefix, screaming_snake_case(self.name))
    }

    fn cfg_name(&self) -> String {
        snake_case(self.name)
    }
}

/// Generate and parse config from a crate name and a list of options.
///
/// Any `SCREAMING_SNAKE_CASE` environment variable starting with
/// `<CRATE>_CONFIG_` is parsed into the [`Value`] type of the matching option
/// and checked against its [`Validator`]. Unset options keep their default.
///
/// Every option is then forwarded to the dependant crate as a
/// `cargo:rustc-env` variable of the same name. `true` booleans are emitted as
/// `snake_case` cfg symbols without the prefix, and enumerations emit one cfg
/// symbol per allowed value.
///
/// Passing `true` for `emit_md_tables` writes
/// `{crate_name}_config_table.md` (the available options) and
/// `{crate_name}_selected_config.md` (the chosen values) into `OUT_DIR`, so
/// they can be included in crate documentation.
///
/// Unknown keys, unparsable values and failed validations abort the build.
pub fn generate_config(
    crate_name: &str,
    config: &[ConfigOption],
    emit_md_tables: bool,
) -> HashMap<String, Value> {
    let configs = match generate_config_internal(std::io::stdout(), crate_name, config, env::vars())
    {
        Ok(configs) => configs,
        Err(e) => panic!("Invalid {crate_name} configuration: {e}"),
    };

    #[cfg(not(test))]
    {
        write_out_file(
            format!("{}_config_data.json", snake_case(crate_name)),
            config_json(&configs, false),
        );
        env_change_work_around(std::io::stdout());
    }

    if emit_md_tables {
        let file_name = snake_case(crate_name);

        let prefix = format!("{}_CONFIG_", screaming_snake_case(crate_name));

        write_out_file(
            format!("{file_name}_config_table.md"),
            markdown::option_table(&prefix, &configs),
        );
        write_out_file(
            format!("{file_name}_selected_config.md"),
            markdown::selected_table(&configs),
        );
    }

    configs.into_iter().map(|(k, _, v)| (k, v)).collect()
}

/// Parse, validate and emit a configuration against an explicit set of
/// variables.
///
/// `vars` stands in for the process environment; only variables starting
/// with the crate's prefix are considered. Cargo directives are written to
/// `stdout`. Returns the environment variable name, the option and the
/// selected value for every option, in declaration order.
pub fn generate_config_internal<'a>(
    mut stdout: impl Write,
    crate_name: &str,
    config: &'a [ConfigOption],
    vars: impl IntoIterator<Item = (String, String)>,
) -> Result<Vec<(String, &'a ConfigOption, Value)>, Error> {
    // Only rebuild if `build.rs` changed. Otherwise, Cargo will rebuild if any
    // other file changed.
    writeln!(stdout, "cargo:rerun-if-changed=build.rs").ok();

    let prefix = format!("{}_CONFIG_", screaming_snake_case(crate_name));

    let mut configs = create_config(&prefix, config);
    capture_from_vars(&prefix, &mut configs, vars)?;

    for (var, option, value) in configs.iter() {
        if let Some(ref validator) = option.constraint {
            validator
                .validate(value)
                .map_err(|e| Error::validation(format!("{var}: {e}")))?;
        }
    }

    emit_configuration(&mut stdout, &configs);

    Ok(configs)
}

fn config_json(config: &[(String, &ConfigOption, Value)], pretty: bool) -> String {
    #[derive(Serialize)]
    struct Item<'a> {
        #[serde(flatten)]
        option: &'a ConfigOption,
        actual_value: Value,
    }

    let to_write = config
        .iter()
        .map(|(_, option, value)| Item {
            option,
            actual_value: value.clone(),
        })
        .collect::<Vec<_>>();

    let json = if pretty {
        serde_json::to_string_pretty(&to_write)
    } else {
        serde_json::to_string(&to_write)
    };

    json.unwrap_or_else(|e| panic!("Unable to serialize configuration: {e}"))
}

// A work-around for https://github.com/rust-lang/cargo/issues/10358
// Changes to `[env]` in `.cargo/config.toml` do not trigger a rebuild on
// their own.
#[cfg(not(test))]
fn env_change_work_around(mut stdout: impl Write) {
    let Some(out_dir) = env::var_os("OUT_DIR") else {
        return;
    };
    let mut out_dir = PathBuf::from(out_dir);

    // Strip trailing directories until the path ends with `target`
    while !out_dir.ends_with("target") {
        if !out_dir.pop() {
            return;
        }
    }
    out_dir.pop();

    let dotcargo = out_dir.join(".cargo/");
    for file in ["config.toml", "config"] {
        let path = dotcargo.join(file);
        if path.exists() {
            writeln!(stdout, "cargo:rerun-if-changed={}", path.display()).ok();
        }
    }
}

fn create_config<'a>(
    prefix: &str,
    config: &'a [ConfigOption],
) -> Vec<(String, &'a ConfigOption, Value)> {
    config
        .iter()
        .map(|option| (option.env_var(prefix), option, option.default_value.clone()))
        .collect()
}

fn capture_from_vars(
    prefix: &str,
    configs: &mut [(String, &ConfigOption, Value)],
    vars: impl IntoIterator<Item = (String, String)>,
) -> Result<(), Error> {
    let mut unknown = Vec::new();
    let mut failed = Vec::new();

    for (var, value) in vars {
        if !var.starts_with(prefix) {
            continue;
        }

        let Some((_, _, cfg)) = configs.iter_mut().find(|(k, _, _)| k == &var) else {
            unknown.push(var);
            continue;
        };

        if let Err(e) = cfg.parse_in_place(&value) {
            failed.push(format!("{var}: {e}"));
        }
    }

    if !failed.is_empty() {
        return Err(Error::parse(format!(
            "Invalid configuration options detected: {failed:?}"
        )));
    }

    if !unknown.is_empty() {
        unknown.sort();
        return Err(Error::parse(format!(
            "Unknown configuration options detected: {unknown:?}"
        )));
    }

    Ok(())
}

fn emit_configuration(mut stdout: impl Write, configs: &[(String, &ConfigOption, Value)]) {
    for (env_var_name, option, value) in configs.iter() {
        let cfg_name = option.cfg_name();

        // The raw value is always forwarded, defaults included.
        writeln!(stdout, "cargo:rustc-env={env_var_name}={value}").ok();
        writeln!(stdout, "cargo:rerun-if-env-changed={env_var_name}").ok();

        writeln!(stdout, "cargo:rustc-check-cfg=cfg({cfg_name})").ok();

        if let Value::Bool(true) = value {
            writeln!(stdout, "cargo:rustc-cfg={cfg_name}").ok();
        }

        if let Some(validator) = option.constraint.as_ref() {
            validator.emit_cargo_extras(&mut stdout, &cfg_name, value);
        }
    }
}

fn write_out_file(file_name: String, contents: String) {
    let Some(out_dir) = env::var_os("OUT_DIR") else {
        panic!("OUT_DIR is not set, `generate_config` must run in a build script");
    };
    let out_file = PathBuf::from(out_dir).join(&file_name);
    if let Err(e) = fs::write(&out_file, contents) {
        panic!("Unable to write {}: {e}", out_file.display());
    }
}

pub(crate) fn snake_case(name: &str) -> String {
    let mut name = name.replace('-', "_");
    name.make_ascii_lowercase();

    name
}

pub(crate) fn screaming_snake_case(name: &str) -> String {
    let mut name = name.replace('-', "_");
    name.make_ascii_uppercase();

    name
}

#[cfg(test)]
mod test {
    use super::*;

    fn option(name: &'static str, default_value: Value) -> ConfigOption {
        ConfigOption {
            name,
            description: "NA",
            default_value,
            constraint: None,
        }
    }

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn lines(stdout: &[u8]) -> Vec<String> {
        std::str::from_utf8(stdout)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn value_number_formats() {
        const INPUTS: &[&str] = &["0xAA", "0o252", "0b0000000010101010", "170"];
        let mut v = Value::Integer(0);

        for input in INPUTS {
            v.parse_in_place(input).unwrap();
            // no matter the input format, the output format should be decimal
            assert_eq!(v.to_string(), "170");
        }
    }

    #[test]
    fn value_bool_inputs() {
        let mut v = Value::Bool(false);

        v.parse_in_place("true").unwrap();
        assert_eq!(v.to_string(), "true");

        v.parse_in_place("false").unwrap();
        assert_eq!(v.to_string(), "false");

        v.parse_in_place("else")
            .expect_err("Only true or false are valid");
    }

    #[test]
    fn env_override() {
        temp_env::with_vars(
            [
                ("VIP_TEST_CONFIG_MONITOR_LEN", Some("0x40000")),
                ("VIP_TEST_CONFIG_ALT_OFFSET", Some("-0x100000")),
                ("VIP_TEST_CONFIG_ADDRESS_MODE", Some("se")),
                ("VIP_TEST_CONFIG_SATA", Some("true")),
            ],
            || {
                let configs = generate_config(
                    "vip-test",
                    &[
                        option("monitor_len", Value::Integer(0x20000)),
                        option("alt_offset", Value::Integer(8)),
                        option("address_mode", Value::String("p2".to_string())),
                        option("sata", Value::Bool(false)),
                        option("baudrate", Value::Integer(115200)),
                        option("prompt", Value::String("VIP1970 # ".to_string())),
                        option("usb_storage", Value::Bool(false)),
                    ],
                    false,
                );

                // some values have changed
                assert_eq!(configs["VIP_TEST_CONFIG_MONITOR_LEN"], Value::Integer(0x40000));
                assert_eq!(
                    configs["VIP_TEST_CONFIG_ALT_OFFSET"],
                    Value::Integer(-0x100000)
                );
                assert_eq!(
                    configs["VIP_TEST_CONFIG_ADDRESS_MODE"],
                    Value::String("se".to_string())
                );
                assert_eq!(configs["VIP_TEST_CONFIG_SATA"], Value::Bool(true));

                // the rest are the defaults
                assert_eq!(configs["VIP_TEST_CONFIG_BAUDRATE"], Value::Integer(115200));
                assert_eq!(
                    configs["VIP_TEST_CONFIG_PROMPT"],
                    Value::String("VIP1970 # ".to_string())
                );
                assert_eq!(configs["VIP_TEST_CONFIG_USB_STORAGE"], Value::Bool(false));
            },
        )
    }

    #[test]
    fn builtin_validation_passes() {
        let config = [
            ConfigOption {
                constraint: Some(Validator::PositiveInteger),
                ..option("input_clock_rate", Value::Integer(30))
            },
            ConfigOption {
                constraint: Some(Validator::NonNegativeInteger),
                ..option("bootdelay", Value::Integer(1))
            },
            ConfigOption {
                constraint: Some(Validator::IntegerInRange(1..4)),
                ..option("asc_uart", Value::Integer(2))
            },
            ConfigOption {
                constraint: Some(Validator::IntegerOneOf(vec![0x20000, 0x40000])),
                ..option("monitor_len", Value::Integer(0x20000))
            },
        ];

        let configs = generate_config_internal(
            Vec::new(),
            "vip-test",
            &config,
            vars(&[
                ("VIP_TEST_CONFIG_INPUT_CLOCK_RATE", "27"),
                ("VIP_TEST_CONFIG_BOOTDELAY", "0"),
                ("VIP_TEST_CONFIG_ASC_UART", "3"),
                ("VIP_TEST_CONFIG_MONITOR_LEN", "0x40000"),
            ]),
        )
        .unwrap();

        assert_eq!(configs[3].2, Value::Integer(0x40000));
    }

    #[test]
    fn custom_validation_passes() {
        let config = [ConfigOption {
            constraint: Some(Validator::Custom(Box::new(|value| {
                if value.as_integer().map_or(true, |v| v % 0x20000 != 0) {
                    Err(Error::validation("value is not sector aligned"))
                } else {
                    Ok(())
                }
            }))),
            ..option("env_offset", Value::Integer(0x20000))
        }];

        generate_config_internal(
            Vec::new(),
            "vip-test",
            &config,
            vars(&[("VIP_TEST_CONFIG_ENV_OFFSET", "0x60000")]),
        )
        .unwrap();
    }

    #[test]
    fn builtin_validation_bails() {
        let config = [ConfigOption {
            constraint: Some(Validator::IntegerOneOf(vec![0x20000, 0x40000])),
            ..option("monitor_len", Value::Integer(0x20000))
        }];

        let err = generate_config_internal(
            Vec::new(),
            "vip-test",
            &config,
            vars(&[("VIP_TEST_CONFIG_MONITOR_LEN", "0x30000")]),
        )
        .err()
        .unwrap();

        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().starts_with("VIP_TEST_CONFIG_MONITOR_LEN"));
    }

    #[test]
    #[should_panic]
    fn validation_failure_panics_in_build_script() {
        temp_env::with_vars([("VIP_TEST_CONFIG_INPUT_CLOCK_RATE", Some("-30"))], || {
            generate_config(
                "vip-test",
                &[ConfigOption {
                    constraint: Some(Validator::PositiveInteger),
                    ..option("input_clock_rate", Value::Integer(30))
                }],
                false,
            )
        });
    }

    #[test]
    fn custom_validation_bails() {
        let config = [ConfigOption {
            constraint: Some(Validator::Custom(Box::new(|value| {
                if value.as_integer().map_or(true, |v| v % 0x20000 != 0) {
                    Err(Error::validation("value is not sector aligned"))
                } else {
                    Ok(())
                }
            }))),
            ..option("env_offset", Value::Integer(0x20000))
        }];

        let err = generate_config_internal(
            Vec::new(),
            "vip-test",
            &config,
            vars(&[("VIP_TEST_CONFIG_ENV_OFFSET", "0x10000")]),
        )
        .err()
        .unwrap();

        assert_eq!(
            err,
            Error::validation("VIP_TEST_CONFIG_ENV_OFFSET: value is not sector aligned")
        );
    }

    #[test]
    fn unknown_option_bails() {
        let err = generate_config_internal(
            Vec::new(),
            "vip-test",
            &[option("sata", Value::Bool(true))],
            vars(&[
                ("VIP_TEST_CONFIG_SATA", "false"),
                ("VIP_TEST_CONFIG_PATA", "true"),
            ]),
        )
        .err()
        .unwrap();

        assert!(matches!(err, Error::Parse(_)));
        assert!(err.to_string().contains("VIP_TEST_CONFIG_PATA"));
    }

    #[test]
    fn invalid_value_bails() {
        let err = generate_config_internal(
            Vec::new(),
            "vip-test",
            &[option("baudrate", Value::Integer(115200))],
            vars(&[("VIP_TEST_CONFIG_BAUDRATE", "fast")]),
        )
        .err()
        .unwrap();

        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn unknown_prefix_is_ignored() {
        let config = [option("baudrate", Value::Integer(115200))];
        let configs = generate_config_internal(
            Vec::new(),
            "vip-test",
            &config,
            vars(&[("VIP_TEST_OTHER_CONFIG_BAUDRATE", "fast")]),
        )
        .unwrap();

        assert_eq!(configs[0].2, Value::Integer(115200));
    }

    #[test]
    fn cargo_directives() {
        let mut stdout = Vec::new();
        generate_config_internal(
            &mut stdout,
            "vip-test",
            &[
                option("sata", Value::Bool(false)),
                option("nor-flash", Value::Bool(true)),
                option("baudrate", Value::Integer(115200)),
            ],
            vars(&[("VIP_TEST_CONFIG_SATA", "true")]),
        )
        .unwrap();

        let lines = lines(&stdout);
        assert!(lines.contains(&"cargo:rerun-if-changed=build.rs".to_string()));
        assert!(lines.contains(&"cargo:rustc-env=VIP_TEST_CONFIG_SATA=true".to_string()));
        assert!(lines.contains(&"cargo:rustc-cfg=sata".to_string()));
        assert!(lines.contains(&"cargo:rustc-check-cfg=cfg(nor_flash)".to_string()));
        assert!(lines.contains(&"cargo:rustc-cfg=nor_flash".to_string()));
        assert!(
            lines.contains(&"cargo:rerun-if-env-changed=VIP_TEST_CONFIG_NOR_FLASH".to_string())
        );
        assert!(lines.contains(&"cargo:rustc-env=VIP_TEST_CONFIG_BAUDRATE=115200".to_string()));
        assert!(!lines.iter().any(|l| l == "cargo:rustc-cfg=baudrate"));
    }

    #[test]
    fn enumeration_validator() {
        let mut stdout = Vec::new();
        generate_config_internal(
            &mut stdout,
            "vip-test",
            &[ConfigOption {
                constraint: Some(Validator::Enumeration(vec![
                    "p2".to_string(),
                    "se".to_string(),
                ])),
                ..option("address-mode", Value::String("p2".to_string()))
            }],
            vars(&[("VIP_TEST_CONFIG_ADDRESS_MODE", "se")]),
        )
        .unwrap();

        let lines = lines(&stdout);
        assert!(lines.contains(&"cargo:rustc-check-cfg=cfg(address_mode)".to_string()));
        assert!(lines.contains(&"cargo:rustc-env=VIP_TEST_CONFIG_ADDRESS_MODE=se".to_string()));
        assert!(lines.contains(&"cargo:rustc-check-cfg=cfg(address_mode_p2)".to_string()));
        assert!(lines.contains(&"cargo:rustc-check-cfg=cfg(address_mode_se)".to_string()));
        assert!(lines.contains(&"cargo:rustc-cfg=address_mode_se".to_string()));
        assert!(!lines.contains(&"cargo:rustc-cfg=address_mode_p2".to_string()));
    }

    #[test]
    fn json_output() {
        let config = [
            ConfigOption {
                constraint: Some(Validator::Enumeration(vec![
                    "asc".to_string(),
                    "dtf".to_string(),
                ])),
                ..option("console", Value::String("asc".to_string()))
            },
            option("usb_storage", Value::Bool(false)),
        ];
        let configs = generate_config_internal(
            Vec::new(),
            "vip-test",
            &config,
            vars(&[("VIP_TEST_CONFIG_CONSOLE", "dtf")]),
        )
        .unwrap();

        let json_output = config_json(&configs, true);
        pretty_assertions::assert_eq!(
            r#"[
  {
    "name": "console",
    "description": "NA",
    "default_value": {
      "String": "asc"
    },
    "constraint": {
      "Enumeration": [
        "asc",
        "dtf"
      ]
    },
    "actual_value": {
      "String": "dtf"
    }
  },
  {
    "name": "usb_storage",
    "description": "NA",
    "default_value": {
      "Bool": false
    },
    "constraint": null,
    "actual_value": {
      "Bool": false
    }
  }
]"#,
            json_output
        );
    }
}
