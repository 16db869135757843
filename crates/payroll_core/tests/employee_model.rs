use chrono::NaiveDate;
use payroll_core::{EmployeeRecord, EmployeeValidationError, NewEmployee};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[test]
fn valid_record_passes_validation() {
    let record = EmployeeRecord::new(1, "Asha", 50000.0, date(2020, 1, 10), "F");
    assert!(record.validate().is_ok());
}

#[test]
fn blank_name_is_rejected() {
    let record = EmployeeRecord::new(1, "   ", 50000.0, date(2020, 1, 10), "F");
    assert_eq!(
        record.validate().unwrap_err(),
        EmployeeValidationError::EmptyName
    );
}

#[test]
fn negative_and_non_finite_salaries_are_rejected() {
    for salary in [-1.0, f64::NAN, f64::INFINITY] {
        let request = NewEmployee::new("Asha", salary, date(2020, 1, 10), "F");
        assert_eq!(
            request.validate().unwrap_err(),
            EmployeeValidationError::InvalidSalary
        );
    }
}

#[test]
fn zero_salary_is_allowed() {
    let request = NewEmployee::new("Asha", 0.0, date(2020, 1, 10), "F");
    assert!(request.validate().is_ok());
}

#[test]
fn record_serializes_dates_as_iso_strings() {
    let record = EmployeeRecord::new(1, "Asha", 50000.0, date(2020, 1, 10), "F");

    let json = serde_json::to_string(&record).unwrap();
    assert!(json.contains("\"start_date\":\"2020-01-10\""));

    let parsed: EmployeeRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, record);
}
