use std::{env, error::Error, path::PathBuf};

use board_config::generate_config;
use board_metadata::{Board, Config, Selection};

fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-changed=../board-metadata/boards");

    // Load the descriptor of the board:
    let config = Config::for_board(Board::Vip1970);

    // Collect the build options and apply them to the board:
    let values = generate_config("vip1970", &config.config_options(), true);

    if env::var_os("VIP1970_CONFIG_INPUT_CLOCK_RATE").is_none() {
        println!(
            "cargo:warning=VIP1970_CONFIG_INPUT_CLOCK_RATE is not set, assuming a {} MHz input clock",
            config.descriptor().board.default_input_clock_mhz
        );
    }

    let selection = Selection::from_values("vip1970", &values)?;
    let board = config.resolve(&selection)?;

    // Define all necessary configuration symbols for the selected board:
    config.define_symbols(&board);

    let out_dir = PathBuf::from(env::var_os("OUT_DIR").ok_or("OUT_DIR is not set")?);
    board.generate_metadata(&out_dir)?;

    Ok(())
}
