//! Markdown tables documenting the options of a crate.

use std::fmt::Write;

use crate::{ConfigOption, Value};

/// Every option with its description, default and allowed values.
pub(crate) fn option_table(prefix: &str, configs: &[(String, &ConfigOption, Value)]) -> String {
    let mut table = format!(
        "\n| Option (`{prefix}*`) | Description | Default value | Allowed value |\n\
         |---|---|---|---|\n"
    );

    for (name, option, _) in configs {
        let allowed = option
            .constraint
            .as_ref()
            .and_then(|validator| validator.description())
            .unwrap_or_else(|| String::from("-"));
        let description = option.description.replace('\n', "<p>");

        writeln!(
            table,
            "|**{name}**|{description}|{}|{allowed}|",
            cell(&option.default_value)
        )
        .ok();
    }

    table
}

/// The value each option resolved to in this build.
pub(crate) fn selected_table(configs: &[(String, &ConfigOption, Value)]) -> String {
    let mut table = String::from("\n| Name | Selected value |\n|---|---|\n");
    for (name, _, value) in configs {
        writeln!(table, "|**{name}**|{}|", cell(value)).ok();
    }

    table
}

// Addresses and sizes read better in hex.
fn cell(value: &Value) -> String {
    match value {
        Value::Integer(i) if *i >= 0x1000 => format!("{i:#x}"),
        Value::String(s) if s.is_empty() => String::from("<empty>"),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Validator;

    #[test]
    fn tables_list_every_option() {
        let clock = ConfigOption {
            name: "input-clock-rate",
            description: "Input clock in Hz",
            default_value: Value::Integer(30_000_000),
            constraint: Some(Validator::PositiveInteger),
        };
        let board = ConfigOption {
            name: "board-name",
            description: "Board string\nprefix",
            default_value: Value::String(String::new()),
            constraint: None,
        };
        let configs = vec![
            (
                String::from("VIP1970_CONFIG_INPUT_CLOCK_RATE"),
                &clock,
                Value::Integer(27_000_000),
            ),
            (
                String::from("VIP1970_CONFIG_BOARD_NAME"),
                &board,
                Value::String(String::new()),
            ),
        ];

        let options = option_table("VIP1970_CONFIG_", &configs);
        assert!(options.contains("| Option (`VIP1970_CONFIG_*`) |"));
        assert!(options.contains(
            "|**VIP1970_CONFIG_INPUT_CLOCK_RATE**|Input clock in Hz|0x1c9c380|Positive integer|"
        ));
        assert!(options.contains("|**VIP1970_CONFIG_BOARD_NAME**|Board string<p>prefix|<empty>|-|"));

        let selected = selected_table(&configs);
        assert!(selected.contains("|**VIP1970_CONFIG_INPUT_CLOCK_RATE**|0x19bfcc0|"));
        assert!(selected.contains("|**VIP1970_CONFIG_BOARD_NAME**|<empty>|"));
    }
}
