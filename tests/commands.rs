use clap::Parser as _;
use growatt_profile_tools::commands;

fn output_of(run: impl FnOnce(&str)) -> String {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("output");
    run(path.to_str().unwrap());
    std::fs::read_to_string(&path).unwrap()
}

#[test]
fn decode_writes_csv() {
    let csv = output_of(|path| {
        let args = commands::decode::Args::try_parse_from([
            "decode",
            "WIT_4000_15000TL3",
            "--bank=input",
            "--window=31200=0,121",
            "--window=31214=530",
            "--format=csv",
            "--output",
            path,
        ])
        .unwrap();
        commands::decode::run(args).unwrap();
    });
    assert_eq!(
        csv,
        "Field,Value,Unit,Label,Raw,Source\n\
         battery_power,121,W,,\"31200=0,31201=121\",battery_power\n\
         battery_voltage_vpp,53,V,,31214=530,battery_voltage_vpp\n\
         battery_voltage,53,V,,31214=530,battery_voltage_vpp\n"
    );
}

#[test]
fn check_defaults_lists_mismatches() {
    let jsonl = output_of(|path| {
        let args = commands::decode::Args::try_parse_from([
            "decode",
            "WIT_4000_15000TL3",
            "-b",
            "holding",
            "-w",
            "30000=5603",
            "-w",
            "30099=0xC8",
            "--check-defaults",
            "-f",
            "jsonl",
            "-o",
            path,
        ])
        .unwrap();
        commands::decode::run(args).unwrap();
    });
    assert_eq!(
        jsonl,
        "{\"address\":30099,\"name\":\"protocol_version\",\"expected\":202,\"actual\":200}\n"
    );
}

#[test]
fn encode_prints_words() {
    let jsonl = output_of(|path| {
        let args = commands::encode::Args::try_parse_from([
            "encode",
            "WIT_4000_15000TL3",
            "onoff_change_mode",
            "UPS (-UP)",
            "--format=jsonl",
            "--output",
            path,
        ])
        .unwrap();
        commands::encode::run(args).unwrap();
    });
    assert_eq!(jsonl, "{\"bank\":\"holding\",\"address\":902,\"word\":2}\n");
}

#[test]
fn encode_rejects_out_of_range_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("output");
    let args = commands::encode::Args::try_parse_from([
        "encode",
        "WIT_4000_15000TL3",
        "backup_soc",
        "150",
        "--output",
        path.to_str().unwrap(),
    ])
    .unwrap();
    let error = commands::encode::run(args).unwrap_err();
    assert!(matches!(
        error,
        commands::encode::Error::Encode(_, _, growatt_profile_tools::Error::OutOfRange { .. })
    ));
    assert!(!path.exists());
}

#[test]
fn plan_and_registers() {
    let csv = output_of(|path| {
        let args = commands::plan::Args::try_parse_from([
            "plan",
            "WIT_4000_15000TL3",
            "--bank=input",
            "--format=csv",
            "--output",
            path,
            "battery_power",
            "battery_temp",
        ])
        .unwrap();
        commands::plan::run(args).unwrap();
    });
    assert_eq!(csv, "Bank,Start,End,Count\ninput,31200,31223,24\n");

    let jsonl = output_of(|path| {
        let args = commands::registers::Args::try_parse_from([
            "registers",
            "WIT_4000_15000TL3",
            "--bank=holding",
            "offgrid voltage",
            "--format=jsonl",
            "--output",
            path,
        ])
        .unwrap();
        commands::registers::run(args).unwrap();
    });
    assert_eq!(jsonl, "");

    let jsonl = output_of(|path| {
        let args = commands::registers::Args::try_parse_from([
            "registers",
            "WIT_4000_15000TL3",
            "--bank=holding",
            "OFFGRID_VOLTAGE",
            "--format=jsonl",
            "--output",
            path,
        ])
        .unwrap();
        commands::registers::run(args).unwrap();
    });
    let record: serde_json::Value = serde_json::from_str(jsonl.trim()).unwrap();
    assert_eq!(record["address"], 936);
    assert_eq!(record["access"], "RW");
    assert_eq!(record["values"][4], "4=127V");
}
