//! WIT series three-phase hybrid inverters with battery storage.

use crate::profile::{ProfileDeclaration, VirtualField};
use crate::registers::{Bank, RegisterEntry};

pub static WIT_4000_15000TL3: ProfileDeclaration = ProfileDeclaration {
    key: "WIT_4000_15000TL3",
    name: "WIT 4-15kW Hybrid",
    description: "Three-phase hybrid inverter with battery storage and UPS/EPS backup (4-15kW)",
    notes: "Uses 0-124, 125-249, 875-999, 8000-8124 and VPP (31000-31399) register ranges. \
            Battery data mapped to 8000-8124 range; battery temperature seen at 31223 (VPP \
            block). Features: UPS 10ms switching, time-of-use programming, VPP/demand \
            management.",
    input: INPUT,
    holding: HOLDING,
    virtual_fields: &[VirtualField {
        bank: Bank::Input,
        name: "battery_temp",
        unit: "°C",
    }],
};

const INPUT: &[RegisterEntry] = crate::input_registers! {
    0: U16, "inverter_status", "", desc = "0=Waiting, 1=Normal, 3=Fault, 5=Standby";
    1: U16, "pv_total_power_high", "", pair = 2;
    2: U16, "pv_total_power_low", "", pair = 1, combined = (D1, "W");
    3: U16_D1, "pv1_voltage", "V";
    4: U16_D1, "pv1_current", "A";
    5: U16, "pv1_power_high", "", pair = 6;
    6: U16, "pv1_power_low", "", pair = 5, combined = (D1, "W");
    7: U16_D1, "pv2_voltage", "V";
    8: U16_D1, "pv2_current", "A";
    9: U16, "pv2_power_high", "", pair = 10;
    10: U16, "pv2_power_low", "", pair = 9, combined = (D1, "W");
    35: I16, "ac_power_high", "", alias = "output_power_high", pair = 36;
    36: I16, "ac_power_low", "", alias = "output_power_low", pair = 35, combined = (D1, "W");
    37: U16_D2, "ac_frequency", "Hz";
    38: U16_D1, "ac_voltage_r", "V", alias = "ac_voltage", desc = "Phase R voltage";
    39: U16_D1, "ac_current_r", "A", alias = "ac_current", desc = "Phase R current";
    40: I16, "ac_power_r_high", "", pair = 41;
    41: I16, "ac_power_r_low", "", pair = 40, combined = (D1, "W");
    42: U16_D1, "ac_voltage_s", "V", desc = "Phase S voltage";
    43: U16_D1, "ac_current_s", "A", desc = "Phase S current";
    44: I16, "ac_power_s_high", "", pair = 45;
    45: I16, "ac_power_s_low", "", pair = 44, combined = (D1, "W");
    46: U16_D1, "ac_voltage_t", "V", desc = "Phase T voltage";
    47: U16_D1, "ac_current_t", "A", desc = "Phase T current";
    48: I16, "ac_power_t_high", "", pair = 49;
    49: I16, "ac_power_t_low", "", pair = 48, combined = (D1, "W");
    50: U16_D1, "line_voltage_rs", "V", desc = "Line voltage R-S";
    51: U16_D1, "line_voltage_st", "V", desc = "Line voltage S-T";
    52: U16_D1, "line_voltage_tr", "V", desc = "Line voltage T-R";
    53: U16, "energy_today_high", "", pair = 54;
    54: U16, "energy_today_low", "", pair = 53, combined = (D1, "kWh");
    55: U16, "energy_total_high", "", pair = 56;
    56: U16, "energy_total_low", "", pair = 55, combined = (D1, "kWh");
    93: I16_D1, "inverter_temp", "°C";
    94: I16_D1, "ipm_temp", "°C";
    95: I16_D1, "boost_temp", "°C";
    100: U16, "power_factor", "";
    104: U16, "derating_mode", "";
    105: U16, "fault_code", "";
    112: U16, "warning_code", "";

    // Grid support, 125-249.
    125: U16, "inv_type_1", "", desc = "Inverter type character 1-2";
    126: U16, "inv_type_2", "", desc = "Inverter type character 3-4";
    127: U16, "inv_type_3", "", desc = "Inverter type character 5-6";
    128: U16, "inv_type_4", "", desc = "Inverter type character 7-8";
    137: U16, "reactive_power_high", "", pair = 138;
    138: U16, "reactive_power_low", "", pair = 137, combined = (D1, "var");
    152: U16_D2, "underfreq_load_start", "Hz", desc = "Underfrequency load start point";
    153: U16_D2, "underfreq_load_end", "Hz", desc = "Underfrequency load end point";
    154: U16_D2, "overfreq_load_start", "Hz", desc = "Overfrequency load start point";
    155: U16_D2, "overfreq_load_end", "Hz", desc = "Overfrequency load end point";
    156: U16_D1, "undervolt_load_start", "V", desc = "Undervoltage load start point";
    157: U16_D1, "undervolt_load_end", "V", desc = "Undervoltage load end point";
    158: U16_D1, "overvolt_load_start", "V", desc = "Overvoltage load start point";
    159: U16_D1, "overvolt_load_end", "V", desc = "Overvoltage load end point";
    180: U16, "meter_link", "", desc = "0=Missed, 1=Received";
    181: U16, "optimizer_count", "", desc = "Number of optimizers connected (0-64)";
    183: U16, "pv_string_scan", "", desc = "String scanning: 0=Not support, 8/16/32=Num strings";
    184: U16, "bdc_parallel_num", "", desc = "Number of BDC units in parallel";
    185: U16, "battery_pack_count", "", desc = "Total battery modules connected";
    187: U16, "vpp_function_status", "", desc = "0=Disabled, 1=Enabled";
    188: U16, "datalog_server_status", "", desc = "0=Connected, 1=Failed";

    // Battery, 8000-8124.
    8034: U16_D1, "battery_voltage", "V";
    8035: I16_D1, "battery_current", "A";
    8045: U16, "self_consumption_power_high", "", pair = 8046;
    8046: U16, "self_consumption_power_low", "", pair = 8045, combined = (D1, "W");
    8063: U16, "self_output_energy_today_high", "", pair = 8064;
    8064: U16, "self_output_energy_today_low", "", pair = 8063, combined = (D1, "kWh");
    8065: U16, "self_output_energy_total_high", "", pair = 8066;
    8066: U16, "self_output_energy_total_low", "", pair = 8065, combined = (D1, "kWh");
    8067: U16, "energy_to_user_today_high", "", pair = 8068;
    8068: U16, "energy_to_user_today_low", "", pair = 8067, combined = (D1, "kWh");
    8069: U16, "energy_to_user_total_high", "", pair = 8070;
    8070: U16, "energy_to_user_total_low", "", pair = 8069, combined = (D1, "kWh");
    8071: U16, "energy_to_grid_today_high", "", pair = 8072;
    8072: U16, "energy_to_grid_today_low", "", pair = 8071, combined = (D1, "kWh");
    8073: U16, "energy_to_grid_total_high", "", pair = 8074;
    8074: U16, "energy_to_grid_total_low", "", pair = 8073, combined = (D1, "kWh");
    8075: U16, "load_energy_today_high", "", pair = 8076;
    8076: U16, "load_energy_today_low", "", pair = 8075, combined = (D1, "kWh");
    8077: U16, "load_energy_total_high", "", pair = 8078;
    8078: U16, "load_energy_total_low", "", pair = 8077, combined = (D1, "kWh");
    8079: U16, "power_to_load_high", "", pair = 8080, desc = "Total load power (Ptoload)";
    8080: U16, "power_to_load_low", "", pair = 8079, combined = (D1, "W");
    8081: U16, "power_to_user_high", "", pair = 8082, desc = "Total forward power (grid import)";
    8082: U16, "power_to_user_low", "", pair = 8081, combined = (D1, "W");
    8083: U16, "power_to_grid_high", "", pair = 8084, desc = "Total reverse power (grid export)";
    8084: U16, "power_to_grid_low", "", pair = 8083, combined = (D1, "W");
    8085: U16, "system_output_power_high", "", pair = 8086;
    8086: U16, "system_output_power_low", "", pair = 8085, combined = (D1, "W");
    8093: U16, "battery_soc", "%";
    8094: U16, "battery_soh", "%";

    // VPP battery cluster, 31200-31323. Field testing puts battery power at 1 W per count even
    // though the VPP documentation claims 0.1 W (53.2 V × 2.2 A reads as 121).
    31200: U16, "battery_power_high", "", pair = 31201;
    31201: I16, "battery_power_low", "", pair = 31200, combined = (X1, "W");
    31202: U16, "charge_energy_today_high", "", pair = 31203;
    31203: U16, "charge_energy_today_low", "", pair = 31202, combined = (D1, "kWh");
    31204: U16, "charge_energy_total_high", "", pair = 31205;
    31205: U16, "charge_energy_total_low", "", pair = 31204, combined = (D1, "kWh");
    31206: U16, "discharge_energy_today_high", "", pair = 31207;
    31207: U16, "discharge_energy_today_low", "", pair = 31206, combined = (D1, "kWh");
    31208: U16, "discharge_energy_total_high", "", pair = 31209;
    31209: U16, "discharge_energy_total_low", "", pair = 31208, combined = (D1, "kWh");
    31210: U16, "max_charge_power_high", "", pair = 31211, desc = "Charge power limit";
    31211: U16, "max_charge_power_low", "", pair = 31210, combined = (D1, "W");
    31212: U16, "max_discharge_power_high", "", pair = 31213, desc = "Discharge power limit";
    31213: U16, "max_discharge_power_low", "", pair = 31212, combined = (D1, "W");
    31214: I16_D1, "battery_voltage_vpp", "V", maps_to = "battery_voltage";
    31215: I16_D1, "battery_current_vpp", "A", maps_to = "battery_current";
    31217: U16, "battery_soc_vpp", "%", maps_to = "battery_soc";
    31222: I16_D1, "battery_temp_vpp", "°C", maps_to = "battery_temp";
    31223: I16_D1, "battery_temp_alt", "°C", maps_to = "battery_temp",
        desc = "Alternative battery temp register";
};

const HOLDING: &[RegisterEntry] = crate::holding_registers! {
    0: U16, RW, "on_off", "", desc = "0=Off, 1=On";
    3: U16, RW, "active_power_rate", "%";
    137: U16, RW, "reactive_power_high", "", pair = 138;
    138: U16, RW, "reactive_power_low", "", pair = 137, combined = (D1, "var");
    139: U16, RW, "reactive_priority_enable", "", desc = "0=Disable, 1=Enable";
    140: U16_D1, RW, "reactive_power_ratio", "";
    141: U16, RW, "svg_night_enable", "", desc = "0=Disable, 1=Enable";
    142: U16_D2, RW, "underfreq_upload_point", "Hz";
    143: U16_D2, RW, "overfreq_derate_recover", "Hz";
    144: U16_X05, RW, "overfreq_derate_delay", "s", desc = "50ms steps, 0-30000";
    148: U16_D1, RW, "hvolt_derate_high", "V";
    149: U16_D1, RW, "hvolt_derate_low", "V";
    152: U16_D2, RW, "underfreq_load_start_set", "Hz";
    153: U16_D2, RW, "underfreq_load_end_set", "Hz";
    154: U16_D2, RW, "overfreq_load_start_set", "Hz";
    155: U16_D2, RW, "overfreq_load_end_set", "Hz";
    156: U16_D1, RW, "undervolt_load_start_set", "V";
    157: U16_D1, RW, "undervolt_load_end_set", "V";
    158: U16_D1, RW, "overvolt_load_start_set", "V";
    159: U16_D1, RW, "overvolt_load_end_set", "V";
    180: U16, RW, "meter_link_set", "", desc = "0=Missed, 1=Received";
    181: U16, RW, "optimizer_count_set", "", range = (0, 64);

    // Remote power control: 202 = 1 hands control over, 201 sets the percentage.
    201: U16, RW, "vpp_remote_cmd_percent", "%", range = (0, 100),
        desc = "Remote power command percent (0-100%)";
    202: U16, RW, "vpp_remote_enable", "", values = { 0 => "Disabled", 1 => "Enabled" },
        desc = "Enable remote power control";
    203: U16, W_, "pid_voltage_option", "V", range = (300, 1000);

    // Serial number, two characters per register.
    209: U16, R_, "serial_1_2", "";
    210: U16, R_, "serial_3_4", "";
    211: U16, R_, "serial_5_6", "";
    212: U16, R_, "serial_7_8", "";
    213: U16, R_, "serial_9_10", "";
    214: U16, R_, "serial_11_12", "";
    215: U16, R_, "serial_13_14", "";
    216: U16, R_, "serial_15_16", "";
    217: U16, R_, "serial_17_18", "";
    218: U16, R_, "serial_19_20", "";

    229: U16_D1, RW, "energy_adjust", "%", range = (1, 1000);
    230: U16, W_, "island_disable", "", desc = "0=Enable, 1=Disable";
    236: U16, W_, "nonstd_vac_enable", "", desc = "0=Disable, 1=Grade1, 2=Grade2";
    871: U16, RW, "grid_phase_sequence", "", desc = "0=Positive, 1=Reverse";
    874: U16, RW, "parallel_enable", "", desc = "0=Disable, 1=Enable";

    // Business storage, 875-999.
    875: U16, R_, "ats_fw_build_5", "", desc = "ATS version (MB)";
    876: U16, R_, "ats_fw_build_4", "", desc = "ATS version (AA)";
    877: U16, R_, "ats_dsp1_fw_build", "";
    878: U16, R_, "ats_dsp2_fw_build", "";
    879: U16, RW, "product_set_enable", "", desc = "0=Disable, 1=Enable";
    897: U16, RW, "grid_reconnect_wait_time", "s", range = (0, 65536), desc = "Default 300s";
    900: U16, RW, "sts_enable", "", desc = "0=Disable, 1=Enable";
    901: U16, RW, "oil_engine_enable", "", desc = "0=Disable, 1=Enable";
    902: U16, RW, "onoff_change_mode", "",
        values = { 0 => "Hybrid (-H)", 1 => "Economy (-EP)", 2 => "UPS (-UP)" },
        desc = "0=-H, 1=-EP, 2=-UP";
    903: U16, RW, "pcs_type", "",
        values = { 0 => "All-in-one storage", 1 => "Energy storage machine" };
    904: U16, RW, "battery_type", "", values = { 0 => "Direct attach", 1 => "DC-DC" };
    905: U16, RW, "ac_charge_power_rate", "%", range = (0, 100);
    906: U16_D1, RW, "battery_max_charge_voltage", "V";
    907: U16_D1, RW, "battery_eod_voltage", "V", desc = "End of discharge voltage";
    908: U16, RW, "ongrid_phase_mode", "",
        values = { 0 => "3P3W (3-phase 3-wire)", 1 => "3P4W (3-phase 4-wire)" };
    909: U16, RW, "offgrid_phase_mode", "",
        values = { 0 => "3P3W (3-phase 3-wire)", 1 => "3P4W (3-phase 4-wire)" };
    910: U16_D1, RW, "battery_max_charge_current", "A";
    911: U16_D1, RW, "battery_max_discharge_current", "A";
    912: U16, RW, "ongrid_offgrid_mode", "", values = { 0 => "Auto", 1 => "Manual" };
    913: U16, RW, "ongrid_offgrid_set", "", values = { 0 => "On-grid", 1 => "Off-grid" },
        desc = "Manual mode only";
    914: U16, RW, "offgrid_softstart_enable", "", desc = "0=Disable, 1=Enable";
    915: U16_D1, RW, "offgrid_softstart_time", "s", range = (2, 20);
    917: U16, RW, "battery_capacity", "Ah";
    918: U16, RW, "vpp_enable", "", desc = "0=Disable, 1=Enable";
    919: U16_D1, RW, "vpp_active_power_set", "kW";
    936: U16, RW, "offgrid_voltage", "",
        values = { 0 => "220V", 1 => "230V", 2 => "240V", 3 => "277V", 4 => "127V" };
    937: U16, RW, "offgrid_frequency", "", values = { 0 => "50Hz", 1 => "60Hz" };
    938: U16, RW, "load_pv_inverter", "", values = { 0 => "No", 1 => "Yes" },
        desc = "PCS load port has inverter";
    939: U16, RW, "dg_start_soc", "%", desc = "SOC to start oil engine";
    940: U16, RW, "dg_stop_soc", "%", desc = "SOC to stop oil engine";
    944: U16, RW, "demand_discharge_limit", "kW";
    945: U16, RW, "demand_charge_limit", "kW";
    946: U16, RW, "demand_manage_enable", "", desc = "0=Disable, 1=Enable";
    947: U16, RW, "power_unbalance_ctrl_enable", "", desc = "0=Disable, 1=Enable";
    948: U16, RW, "pcs_parallel_num", "";
    949: U16, RW, "ac_charge_enable", "", desc = "0=Disable, 1=Enable";
    950: U16, RW, "offgrid_enable", "", desc = "0=Disable, 1=Enable";
    951: U16, RW, "battery_charge_stop_soc", "%", range = (0, 100);
    952: U16, RW, "battery_discharge_stop_soc", "%", range = (0, 100);
    953: U16, RW, "single_phase_antibackflow", "", desc = "0=Disable, 1=Enable";

    // Time-of-use slots.
    954: U16, RW, "time1_enable", "",
        desc = "Bit13-14: 0=Load first, 1=Battery first, 2=Grid first; Bit15: 0=Disable, 1=Enable";
    955: U16, RW, "time1_start", "", desc = "Bit0-7: minutes, Bit8-12: hours";
    956: U16, RW, "time1_end", "", desc = "Bit0-7: minutes, Bit8-12: hours";
    957: U16, RW, "time2_enable", "";
    958: U16, RW, "time2_start", "";
    959: U16, RW, "time2_end", "";
    960: U16, RW, "time3_enable", "";
    961: U16, RW, "time3_start", "";
    962: U16, RW, "time3_end", "";
    963: U16, RW, "time4_enable", "";
    964: U16, RW, "time4_start", "";
    965: U16, RW, "time4_end", "";
    966: U16, RW, "time5_enable", "";
    967: U16, RW, "time5_start", "";
    968: U16, RW, "time5_end", "";
    969: U16, RW, "time6_enable", "";
    970: U16, RW, "time6_start", "";
    971: U16, RW, "time6_end", "";

    972: U16, RW, "bms_enable", "", desc = "0=Disable, 1=Enable";
    // Same switch as 874, as seen from the storage block.
    973: U16, RW, "parallel_enable_storage", "", maps_to = "parallel_enable",
        desc = "0=Disable, 1=Enable";
    974: U16_D1, RW, "battery_charge_power_limit", "kW";
    975: U16_D1, RW, "battery_discharge_power_limit", "kW";
    976: U16_D2, RW, "ats_spec_power", "W";
    987: U16, RW, "esp_const_nc_enable", "", values = { 0 => "Valid low", 1 => "Valid high" },
        desc = "Emergency stop config";
    988: U16, RW, "machine_type", "", values = { 0 => "WIT", 1 => "WIS" },
        desc = "Machine type identifier";
    989: U16, RW, "force_power_slow_change", "", values = { 0 => "Disable", 1 => "Enable" };
    990: U16, RW, "force_power_time1", "%", range = (0, 100), desc = "WIS only";
    991: U16, RW, "force_power_time2", "%", range = (0, 100), desc = "WIS only";
    992: U16, RW, "force_power_time3", "%", range = (0, 100), desc = "WIS only";
    993: U16, RW, "force_power_time4", "%", range = (0, 100), desc = "WIS only";
    994: U16, RW, "force_power_time5", "%", range = (0, 100), desc = "WIS only";
    995: U16, RW, "force_power_time6", "%", range = (0, 100), desc = "WIS only";
    996: U16, RW, "backup_soc", "%", range = (0, 100), desc = "Default 50%";
    997: U16, RW, "backup_soc_enable", "", values = { 0 => "Disable", 1 => "Enable" },
        desc = "Backup SOC for demand management";
    998: U16, RW, "offgrid_discharge_stop_soc", "%", range = (0, 100);

    // Device identification.
    30000: U16, RO, "dtc_code", "", default = 5603, desc = "Device Type Code: 5603 for WIT 4-15kW";
    30099: U16, RO, "protocol_version", "", default = 202,
        desc = "VPP Protocol version (202 = V2.02)";
};
