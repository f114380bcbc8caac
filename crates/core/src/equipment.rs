//! Equipment type and status codes.

pub mod equipment_type {
    pub const TEMP_HUMIDITY_SENSOR: i32 = 0;
    pub const SOIL_MOISTURE_SENSOR: i32 = 1;
    pub const LIGHT_SENSOR: i32 = 2;
    pub const CO2_SENSOR: i32 = 3;
    pub const CAMERA: i32 = 4;
    pub const WEATHER_STATION: i32 = 5;
    pub const IRRIGATION_CONTROLLER: i32 = 6;
    pub const OTHER: i32 = 99;

    pub const ALL: &[i32] = &[
        TEMP_HUMIDITY_SENSOR,
        SOIL_MOISTURE_SENSOR,
        LIGHT_SENSOR,
        CO2_SENSOR,
        CAMERA,
        WEATHER_STATION,
        IRRIGATION_CONTROLLER,
        OTHER,
    ];

    pub fn label(code: i32) -> &'static str {
        match code {
            TEMP_HUMIDITY_SENSOR => "Temperature/humidity sensor",
            SOIL_MOISTURE_SENSOR => "Soil moisture sensor",
            LIGHT_SENSOR => "Light sensor",
            CO2_SENSOR => "CO2 sensor",
            CAMERA => "Camera",
            WEATHER_STATION => "Weather station",
            IRRIGATION_CONTROLLER => "Irrigation controller",
            _ => "Other",
        }
    }
}

pub mod equipment_status {
    pub const ONLINE: i32 = 0;
    pub const OFFLINE: i32 = 1;
    pub const FAULT: i32 = 2;
    pub const MAINTENANCE: i32 = 3;

    pub const ALL: &[i32] = &[ONLINE, OFFLINE, FAULT, MAINTENANCE];

    pub fn label(code: i32) -> &'static str {
        match code {
            ONLINE => "Online",
            OFFLINE => "Offline",
            FAULT => "Fault",
            MAINTENANCE => "Maintenance",
            _ => "Unknown",
        }
    }
}

/// Battery readings below this are reported as low.
pub const BATTERY_LOW_BELOW: i32 = 20;
/// Battery readings below this (and not low) are reported as medium.
pub const BATTERY_MEDIUM_BELOW: i32 = 60;
