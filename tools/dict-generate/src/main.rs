mod json_io;

use crate::json_io::StoreJson;
use clap::{Arg, Command};
use opencc_engine::dictionary_lib::DictionaryStore;
use std::fs::File;
use std::io;
use std::io::{BufWriter, Write};
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    const BLUE: &str = "\x1B[1;34m"; // Bold Blue
    const RESET: &str = "\x1B[0m";

    let matches = Command::new("Dictionary Generator")
        .about(format!(
            "{BLUE}Dict Generator: compile OpenCC lexicon files into a dictionary artifact{RESET}"
        ))
        .after_help(
            "Examples:\n\
         \n\
         dict-generate --format zstd --output dictionary.zstd\n\
         dict-generate --input ./dicts --format json --pretty\n\
         \n\
         Point OPENCC_DICT_FILE at a zstd or cbor artifact to load it instead of the built-in lexicons.\n",
        )
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("dir")
                .default_value("dicts")
                .help("Directory holding the lexicon *.txt files"),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_name("format")
                .default_value("zstd")
                .value_parser(["zstd", "cbor", "json"])
                .help("Dictionary format: [zstd|cbor|json]"),
        )
        .arg(
            Arg::new("pretty")
                .long("pretty")
                .action(clap::ArgAction::SetTrue)
                .help("Pretty-print JSON when --format json"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("filename")
                .help("Write the artifact to <filename> (default: dictionary.<format>)"),
        )
        .get_matches();

    let dict_dir = matches
        .get_one::<String>("input")
        .map(String::as_str)
        .unwrap_or("dicts");
    if !Path::new(dict_dir).is_dir() {
        eprintln!(
            "{BLUE}Lexicon directory '{dict_dir}' not found.{RESET}\n\
         Place OpenCC lexicon files (*.txt) there or pass --input <dir>."
        );
        std::process::exit(1);
    }

    let dict_format = matches
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("zstd");
    let pretty_json = matches.get_flag("pretty");

    let default_output = format!("dictionary.{dict_format}");
    let output_file = matches
        .get_one::<String>("output")
        .cloned()
        .unwrap_or(default_output);

    let store = DictionaryStore::from_dir(dict_dir)?;
    eprintln!(
        "{BLUE}Loaded {} lexicons from {dict_dir}{RESET}",
        store.loaded().len()
    );

    match dict_format {
        "zstd" => {
            store.save_compressed(&output_file)?;
            eprintln!("{BLUE}Dictionary saved in ZSTD format at: {output_file}{RESET}");
        }
        "cbor" => {
            store.serialize_to_cbor(&output_file)?;
            eprintln!("{BLUE}Dictionary saved in CBOR format at: {output_file}{RESET}");
        }
        "json" => {
            write_reference_json(&store, &output_file, pretty_json)?;
            let style = if pretty_json { "pretty" } else { "compact" };
            eprintln!("{BLUE}Dictionary saved in JSON ({style}) at: {output_file}{RESET}");
        }
        other => {
            eprintln!("{BLUE}Unsupported format: {other}{RESET}");
        }
    }

    Ok(())
}

pub fn write_reference_json(
    store: &DictionaryStore,
    path: impl AsRef<Path>,
    pretty: bool,
) -> io::Result<()> {
    let dto = StoreJson::from(store);
    let file = File::create(path)?;
    let mut w = BufWriter::new(file);
    if pretty {
        serde_json::to_writer_pretty(&mut w, &dto).map_err(io::Error::other)?;
    } else {
        serde_json::to_writer(&mut w, &dto).map_err(io::Error::other)?;
    }
    // newline for POSIX-y tools
    w.write_all(b"\n")?;
    w.flush()
}
