use growatt_profile_tools::codec::{self, Label, Raw, RegisterBuffer};
use growatt_profile_tools::error::{BufferDefect, Error};
use growatt_profile_tools::registers::Bank;
use growatt_profile_tools::registry::Registry;

const WIT: &str = "WIT_4000_15000TL3";

#[test]
fn vpp_battery_power_is_one_watt_per_count() {
    let profile = Registry::builtin().unwrap().load(WIT).unwrap();
    let buffer = RegisterBuffer::new(31200, &[0, 121]).unwrap();
    let decoded = codec::decode(&profile, Bank::Input, &buffer);
    let power = decoded.get("battery_power").unwrap();
    assert_eq!(power.value, 121.0);
    assert_eq!(power.unit, "W");
    assert_eq!(
        power.raw,
        Raw::Pair { high_address: 31200, high: 0, low_address: 31201, low: 121 }
    );
}

#[test]
fn battery_power_is_signed_through_the_low_word() {
    let profile = Registry::builtin().unwrap().load(WIT).unwrap();
    let buffer = RegisterBuffer::new(31200, &[0xFFFF, 0xFC18]).unwrap();
    let decoded = codec::decode(&profile, Bank::Input, &buffer);
    assert_eq!(decoded.value("battery_power"), Some(-1000.0));
    assert_eq!(decoded.get("battery_power").unwrap().integer, -1000);
}

#[test]
fn combined_pv_power() {
    let profile = Registry::builtin().unwrap().load(WIT).unwrap();
    let buffer = RegisterBuffer::new(1, &[5, 12000]).unwrap();
    let decoded = codec::decode(&profile, Bank::Input, &buffer);
    assert_eq!(decoded.value("pv_total_power"), Some(33968.0));
    assert_eq!(decoded.len(), 1);
}

#[test]
fn pair_needs_both_halves() {
    let profile = Registry::builtin().unwrap().load(WIT).unwrap();
    // Window ends between the halves of pv1_power.
    let buffer = RegisterBuffer::new(3, &[3500, 42, 0]).unwrap();
    let decoded = codec::decode(&profile, Bank::Input, &buffer);
    assert_eq!(decoded.value("pv1_voltage"), Some(350.0));
    assert_eq!(decoded.value("pv1_current"), Some(4.2));
    assert!(!decoded.contains("pv1_power"));

    let buffer = RegisterBuffer::from_windows([(3, &[3500, 42, 0][..]), (6, &[1470][..])]).unwrap();
    let decoded = codec::decode(&profile, Bank::Input, &buffer);
    assert_eq!(decoded.value("pv1_power"), Some(147.0));
}

#[test]
fn three_phase_output_with_aliases() {
    let profile = Registry::builtin().unwrap().load(WIT).unwrap();
    let words = [0, 15000, 5000, 2301, 217, 0, 5000];
    let buffer = RegisterBuffer::new(35, &words).unwrap();
    let decoded = codec::decode(&profile, Bank::Input, &buffer);
    assert_eq!(decoded.value("ac_power"), Some(1500.0));
    assert_eq!(decoded.value("output_power"), Some(1500.0));
    assert_eq!(decoded.value("ac_frequency"), Some(50.0));
    assert_eq!(decoded.value("ac_voltage"), Some(230.1));
    assert_eq!(decoded.value("ac_voltage_r"), Some(230.1));
    assert_eq!(decoded.value("ac_current"), Some(21.7));
    assert_eq!(decoded.value("ac_power_r"), Some(500.0));
}

#[test]
fn canonical_battery_values_prefer_the_primary_block() {
    let profile = Registry::builtin().unwrap().load(WIT).unwrap();
    let windows: [(u16, &[u16]); 3] = [
        (8034, &[532, 0xFFEC]),
        (8093, &[87, 100]),
        (31214, &[530, 0xFFEB, 0, 86, 0, 0, 0, 0, 210, 215]),
    ];
    let buffer = RegisterBuffer::from_windows(windows).unwrap();
    let decoded = codec::decode(&profile, Bank::Input, &buffer);
    assert_eq!(decoded.value("battery_voltage"), Some(53.2));
    assert_eq!(decoded.value("battery_current"), Some(-2.0));
    assert_eq!(decoded.value("battery_soc"), Some(87.0));
    assert_eq!(decoded.value("battery_voltage_vpp"), Some(53.0));
    assert_eq!(decoded.value("battery_current_vpp"), Some(-2.1));
    assert_eq!(decoded.value("battery_soc_vpp"), Some(86.0));
    assert_eq!(decoded.get("battery_soc").unwrap().source, "battery_soc");

    let temp = decoded.get("battery_temp").unwrap();
    assert_eq!(temp.value, 21.0);
    assert_eq!(temp.unit, "°C");
    assert_eq!(temp.source, "battery_temp_vpp");
    assert_eq!(decoded.value("battery_temp_alt"), Some(21.5));
}

#[test]
fn canonical_battery_values_fall_back_to_vpp() {
    let profile = Registry::builtin().unwrap().load(WIT).unwrap();
    let buffer = RegisterBuffer::new(31214, &[530, 0xFFEB, 0, 86]).unwrap();
    let decoded = codec::decode(&profile, Bank::Input, &buffer);
    assert_eq!(decoded.value("battery_voltage"), Some(53.0));
    assert_eq!(decoded.get("battery_voltage").unwrap().source, "battery_voltage_vpp");
    assert_eq!(decoded.value("battery_current"), Some(-2.1));
    assert_eq!(decoded.value("battery_soc"), Some(86.0));
    assert!(!decoded.contains("battery_temp"));
}

#[test]
fn battery_temperature_from_the_relocated_register() {
    let profile = Registry::builtin().unwrap().load(WIT).unwrap();
    let buffer = RegisterBuffer::new(31223, &[215]).unwrap();
    let decoded = codec::decode(&profile, Bank::Input, &buffer);
    let temp = decoded.get("battery_temp").unwrap();
    assert_eq!(temp.value, 21.5);
    assert_eq!(temp.source, "battery_temp_alt");
    let single = codec::read_field(&profile, Bank::Input, "battery_temp", &buffer).unwrap();
    assert_eq!(single.map(|r| r.source), Some("battery_temp_alt"));
}

#[test]
fn read_field_by_any_name() {
    let profile = Registry::builtin().unwrap().load(WIT).unwrap();
    let buffer = RegisterBuffer::new(35, &[0, 15000]).unwrap();
    let read = |name| codec::read_field(&profile, Bank::Input, name, &buffer).unwrap();
    assert_eq!(read("output_power").map(|r| r.value), Some(1500.0));
    assert_eq!(read("ac_power_low").map(|r| r.value), Some(15000.0));
    assert_eq!(read("output_power_high").map(|r| r.value), Some(0.0));
    assert_eq!(read("ac_voltage"), None);
    assert_eq!(
        codec::read_field(&profile, Bank::Input, "ac_power_x", &buffer),
        Err(Error::UnknownField { bank: Bank::Input, name: "ac_power_x".into() })
    );
}

#[test]
fn enumerated_holding_registers() {
    let profile = Registry::builtin().unwrap().load(WIT).unwrap();
    let buffer = RegisterBuffer::new(902, &[2, 1, 0]).unwrap();
    let decoded = codec::decode(&profile, Bank::Holding, &buffer);
    assert_eq!(decoded.get("onoff_change_mode").unwrap().label, Some(Label::Known("UPS (-UP)")));
    assert_eq!(
        decoded.get("pcs_type").unwrap().label,
        Some(Label::Known("Energy storage machine"))
    );
    assert_eq!(decoded.get("battery_type").unwrap().label, Some(Label::Known("Direct attach")));

    let buffer = RegisterBuffer::new(936, &[9]).unwrap();
    let decoded = codec::decode(&profile, Bank::Holding, &buffer);
    let voltage = decoded.get("offgrid_voltage").unwrap();
    assert_eq!(voltage.label, Some(Label::Unknown(9)));
    assert_eq!(voltage.integer, 9);
}

#[test]
fn write_only_and_storage_alternates() {
    let profile = Registry::builtin().unwrap().load(WIT).unwrap();
    let buffer = RegisterBuffer::new(201, &[80, 1, 600]).unwrap();
    let decoded = codec::decode(&profile, Bank::Holding, &buffer);
    assert_eq!(decoded.value("vpp_remote_cmd_percent"), Some(80.0));
    assert!(!decoded.contains("pid_voltage_option"));

    let buffer = RegisterBuffer::new(973, &[1]).unwrap();
    let decoded = codec::decode(&profile, Bank::Holding, &buffer);
    assert_eq!(decoded.get("parallel_enable").unwrap().source, "parallel_enable_storage");
}

#[test]
fn self_test_against_documented_defaults() {
    let profile = Registry::builtin().unwrap().load(WIT).unwrap();
    let buffer =
        RegisterBuffer::from_windows([(30000, &[5603][..]), (30099, &[202][..])]).unwrap();
    assert!(codec::check_defaults(&profile, Bank::Holding, &buffer).is_empty());

    let buffer = RegisterBuffer::new(30000, &[5400]).unwrap();
    let mismatches = codec::check_defaults(&profile, Bank::Holding, &buffer);
    assert_eq!(mismatches.len(), 1);
    assert_eq!((mismatches[0].name, mismatches[0].expected, mismatches[0].actual), ("dtc_code", 5603, 5400));
}

#[test]
fn malformed_buffers() {
    assert_eq!(
        RegisterBuffer::from_windows([(0, &[1, 2, 3][..]), (2, &[4][..])]).unwrap_err(),
        Error::MalformedBuffer(BufferDefect::Overlap { base: 2, address: 2 })
    );
    assert_eq!(
        RegisterBuffer::new(65530, &[0; 7]).unwrap_err(),
        Error::MalformedBuffer(BufferDefect::PastEnd { base: 65530, len: 7 })
    );
    assert!(matches!(
        Registry::builtin().unwrap().decode(WIT, Bank::Input, 65535, &[1, 2]),
        Err(Error::MalformedBuffer(_))
    ));
}
