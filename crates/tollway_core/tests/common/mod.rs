#![allow(dead_code)]

use rusqlite::{params, Connection};
use tollway_core::NewVehicle;

pub const OWNER_ID: i64 = 10;
pub const OTHER_OWNER_ID: i64 = 11;
pub const EMISSION_CLASS_ID: i64 = 5;
pub const CATEGORY_ID: i64 = 1;

/// Inserts users, one emission class, one toll category and three segments.
pub fn seed_reference_data(conn: &Connection) {
    conn.execute_batch(
        "INSERT INTO users (user_id, name) VALUES (10, 'Spedition Nord'), (11, 'Kurier Sued');
         INSERT INTO emission_classes (emission_class_id, name) VALUES (5, 'EURO 6');
         INSERT INTO toll_categories (category_id, emission_class_id, axle_class, rate_per_km_cents)
         VALUES (1, 5, '>= 5', 19);
         INSERT INTO toll_segments (segment_id, length_m, start_coordinate, end_coordinate, name, segment_type)
         VALUES
            (1203, 4100, '52.5200,13.4050', '52.4810,13.5230', 'A100 Treptow', 'motorway'),
            (1187, 9800, '52.3906,13.0645', '52.4430,13.2010', 'A115 Avus', 'motorway'),
            (2001, 2300, '52.6010,13.2900', '52.6180,13.3120', 'B96 Hermsdorf', 'federal_road');",
    )
    .unwrap();
}

pub fn new_vehicle(vehicle_id: i64, vin: &str) -> NewVehicle {
    NewVehicle {
        vehicle_id,
        emission_class_id: EMISSION_CLASS_ID,
        user_id: OWNER_ID,
        license_plate: format!("B-TW {vehicle_id}"),
        vin: vin.to_string(),
        axles: 5,
        weight_kg: 40_000,
        registration_country: "D".to_string(),
    }
}

pub fn insert_vehicle(conn: &Connection, vehicle_id: i64, user_id: i64, vin: &str) {
    conn.execute(
        "INSERT INTO vehicles (
            vehicle_id, emission_class_id, user_id, license_plate, vin,
            axles, weight_kg, registration_country
         ) VALUES (?1, ?2, ?3, ?4, ?5, 4, 18000, 'D');",
        params![vehicle_id, EMISSION_CLASS_ID, user_id, format!("HH-X {vehicle_id}"), vin],
    )
    .unwrap();
}

pub fn insert_unit(conn: &Connection, unit_id: i64, vehicle_id: i64, status: &str) {
    conn.execute(
        "INSERT INTO on_board_units (unit_id, vehicle_id, status) VALUES (?1, ?2, ?3);",
        params![unit_id, vehicle_id, status],
    )
    .unwrap();
}

pub fn insert_charge(conn: &Connection, charge_id: i64, unit_id: i64, segment_id: i64) {
    conn.execute(
        "INSERT INTO toll_charges (charge_id, segment_id, unit_id, category_id, driven_at, cost_cents)
         VALUES (?1, ?2, ?3, ?4, 1700000000000, 78);",
        params![charge_id, segment_id, unit_id, CATEGORY_ID],
    )
    .unwrap();
}

pub fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}
