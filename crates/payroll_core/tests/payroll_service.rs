use chrono::NaiveDate;
use payroll_core::{
    EmployeeRecord, EmployeeStore, IoTarget, NewEmployee, PayrollService, RepoResult, RosterFile,
    SchemaVariant, ServiceError, UpdateMode,
};
use std::cell::RefCell;
use std::collections::HashMap;

/// In-memory stand-in for a database store.
struct FakeStore {
    records: RefCell<Vec<EmployeeRecord>>,
    next_id: RefCell<i64>,
}

impl FakeStore {
    fn new() -> Self {
        Self::with_records(Vec::new())
    }

    fn with_records(records: Vec<EmployeeRecord>) -> Self {
        let next_id = records.iter().map(|record| record.id).max().unwrap_or(0) + 1;
        Self {
            records: RefCell::new(records),
            next_id: RefCell::new(next_id),
        }
    }

    fn snapshot(&self) -> Vec<EmployeeRecord> {
        self.records.borrow().clone()
    }
}

impl EmployeeStore for FakeStore {
    fn read_all(&self) -> RepoResult<Vec<EmployeeRecord>> {
        Ok(self.snapshot())
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Vec<EmployeeRecord>> {
        Ok(self
            .records
            .borrow()
            .iter()
            .filter(|record| record.name == name)
            .cloned()
            .collect())
    }

    fn update_salary(&self, name: &str, salary: f64, _mode: UpdateMode) -> RepoResult<usize> {
        let mut affected = 0;
        for record in self.records.borrow_mut().iter_mut() {
            if record.name == name {
                record.salary = salary;
                affected += 1;
            }
        }
        Ok(affected)
    }

    fn create(&self, employee: &NewEmployee) -> RepoResult<EmployeeRecord> {
        employee.validate()?;
        let mut next_id = self.next_id.borrow_mut();
        let record = EmployeeRecord::new(
            *next_id,
            employee.name.clone(),
            employee.salary,
            employee.start_date,
            employee.gender.clone(),
        );
        *next_id += 1;
        self.records.borrow_mut().push(record.clone());
        Ok(record)
    }

    fn range_by_start_date(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepoResult<Vec<EmployeeRecord>> {
        Ok(self
            .records
            .borrow()
            .iter()
            .filter(|record| record.start_date >= from && record.start_date <= to)
            .cloned()
            .collect())
    }

    fn average_salary_by_gender(&self) -> RepoResult<HashMap<String, f64>> {
        let mut sums: HashMap<String, (f64, usize)> = HashMap::new();
        for record in self.records.borrow().iter() {
            let entry = sums.entry(record.gender.clone()).or_insert((0.0, 0));
            entry.0 += record.salary;
            entry.1 += 1;
        }
        Ok(sums
            .into_iter()
            .map(|(gender, (sum, count))| (gender, sum / count as f64))
            .collect())
    }
}

/// In-memory stand-in for the flat-file store.
struct FakeRosterFile {
    records: RefCell<Vec<EmployeeRecord>>,
}

impl FakeRosterFile {
    fn new(records: Vec<EmployeeRecord>) -> Self {
        Self {
            records: RefCell::new(records),
        }
    }

    fn snapshot(&self) -> Vec<EmployeeRecord> {
        self.records.borrow().clone()
    }
}

impl RosterFile for FakeRosterFile {
    fn read_all(&self) -> RepoResult<Vec<EmployeeRecord>> {
        Ok(self.snapshot())
    }

    fn write_all(&self, roster: &[EmployeeRecord]) -> RepoResult<()> {
        *self.records.borrow_mut() = roster.to_vec();
        Ok(())
    }

    fn count(&self) -> RepoResult<usize> {
        Ok(self.records.borrow().len())
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn record(id: i64, name: &str, salary: f64) -> EmployeeRecord {
    EmployeeRecord::new(id, name, salary, date(2020, 1, 10), "F")
}

fn empty_service() -> PayrollService<FakeStore, FakeStore, FakeRosterFile> {
    PayrollService::new(
        FakeStore::new(),
        FakeStore::new(),
        FakeRosterFile::new(Vec::new()),
    )
}

#[test]
fn add_employee_appends_created_record_to_roster() {
    let mut service = empty_service();

    let created = service
        .add_employee(&NewEmployee::new("Asha", 50000.0, date(2020, 1, 10), "F"))
        .unwrap();

    assert_eq!(created.id, 1);
    assert_eq!(service.roster().len(), 1);
    assert_eq!(service.roster()[0], created);
}

#[test]
fn update_salary_with_affected_rows_reconciles_roster() {
    let mut service = empty_service();
    service
        .add_employee(&NewEmployee::new("Asha", 50000.0, date(2020, 1, 10), "F"))
        .unwrap();

    service
        .update_salary("Asha", 55000.0, UpdateMode::Direct, SchemaVariant::Denormalised)
        .unwrap();

    assert_eq!(service.roster()[0].salary, 55000.0);
}

#[test]
fn update_salary_with_zero_affected_rows_fails_and_leaves_roster_unchanged() {
    let mut service = empty_service();
    service
        .add_employee(&NewEmployee::new("Asha", 50000.0, date(2020, 1, 10), "F"))
        .unwrap();

    let err = service
        .update_salary("Bilal", 1.0, UpdateMode::Direct, SchemaVariant::Denormalised)
        .unwrap_err();

    assert!(matches!(err, ServiceError::UpdateFailed { name } if name == "Bilal"));
    assert_eq!(service.roster().len(), 1);
    assert_eq!(service.roster()[0].salary, 50000.0);
}

#[test]
fn update_salary_without_roster_match_still_succeeds_with_stale_roster() {
    let store = FakeStore::with_records(vec![record(1, "Asha", 50000.0)]);
    let mut service = PayrollService::new(store, FakeStore::new(), FakeRosterFile::new(Vec::new()));

    service
        .update_salary("Asha", 60000.0, UpdateMode::Direct, SchemaVariant::Denormalised)
        .unwrap();

    assert!(service.roster().is_empty());
    let in_sync = service
        .is_in_sync_with_store("Asha", SchemaVariant::Denormalised)
        .unwrap();
    assert!(!in_sync);
}

#[test]
fn update_salary_targets_the_selected_schema_variant() {
    let denormalised = FakeStore::with_records(vec![record(1, "Asha", 50000.0)]);
    let normalised = FakeStore::with_records(vec![record(1, "Asha", 50000.0)]);
    let mut service =
        PayrollService::new(denormalised, normalised, FakeRosterFile::new(Vec::new()));
    service
        .read_roster(IoTarget::Database, SchemaVariant::Normalised)
        .unwrap();

    service
        .update_salary("Asha", 70000.0, UpdateMode::Prepared, SchemaVariant::Normalised)
        .unwrap();

    assert!(service
        .is_in_sync_with_store("Asha", SchemaVariant::Normalised)
        .unwrap());
    // The denormalised copy was never touched.
    let denorm_salary = service
        .read_roster(IoTarget::Database, SchemaVariant::Denormalised)
        .unwrap()[0]
        .salary;
    assert_eq!(denorm_salary, 50000.0);
}

#[test]
fn read_roster_database_replaces_roster_with_selected_store_contents() {
    let denormalised = FakeStore::with_records(vec![record(1, "Asha", 50000.0)]);
    let normalised = FakeStore::with_records(vec![record(7, "Noor", 42000.0)]);
    let mut service =
        PayrollService::new(denormalised, normalised, FakeRosterFile::new(Vec::new()));

    let from_denorm = service
        .read_roster(IoTarget::Database, SchemaVariant::Denormalised)
        .unwrap();
    assert_eq!(from_denorm.len(), 1);
    assert_eq!(service.roster()[0].name, "Asha");

    let from_norm = service
        .read_roster(IoTarget::Database, SchemaVariant::Normalised)
        .unwrap();
    assert_eq!(from_norm[0].name, "Noor");
    assert_eq!(service.roster()[0].name, "Noor");
}

#[test]
fn read_roster_file_returns_detached_list_without_touching_roster() {
    let file = FakeRosterFile::new(vec![record(3, "Mira", 48000.0)]);
    let mut service = PayrollService::new(FakeStore::new(), FakeStore::new(), file);

    let snapshot = service
        .read_roster(IoTarget::File, SchemaVariant::Denormalised)
        .unwrap();

    assert_eq!(snapshot.len(), 1);
    assert!(service.roster().is_empty());
}

#[test]
fn read_roster_console_is_unsupported() {
    let mut service = empty_service();

    let err = service
        .read_roster(IoTarget::Console, SchemaVariant::Denormalised)
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Unsupported {
            operation: "read_roster",
            target: IoTarget::Console,
        }
    ));
}

#[test]
fn write_roster_file_delegates_whole_roster() {
    let file = FakeRosterFile::new(Vec::new());
    let mut service = PayrollService::new(FakeStore::new(), FakeStore::new(), file);
    service
        .add_employee(&NewEmployee::new("Asha", 50000.0, date(2020, 1, 10), "F"))
        .unwrap();
    service
        .add_employee(&NewEmployee::new("Bilal", 52000.0, date(2021, 3, 1), "M"))
        .unwrap();

    service.write_roster(IoTarget::File).unwrap();

    assert_eq!(service.count_entries(IoTarget::File).unwrap(), 2);
    let written = service
        .read_roster(IoTarget::File, SchemaVariant::Denormalised)
        .unwrap();
    assert_eq!(written, service.roster());
}

#[test]
fn write_roster_database_is_unsupported() {
    let service = empty_service();

    let err = service.write_roster(IoTarget::Database).unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Unsupported {
            operation: "write_roster",
            target: IoTarget::Database,
        }
    ));
}

#[test]
fn count_entries_is_unsupported_for_database_and_console() {
    let service = empty_service();

    for target in [IoTarget::Database, IoTarget::Console] {
        let err = service.count_entries(target).unwrap_err();
        assert!(matches!(err, ServiceError::Unsupported { .. }));
    }
}

#[test]
fn sync_check_reports_true_only_for_fieldwise_equal_records() {
    let store = FakeStore::with_records(vec![record(1, "Asha", 50000.0)]);
    let mut service = PayrollService::new(store, FakeStore::new(), FakeRosterFile::new(Vec::new()));
    service
        .read_roster(IoTarget::Database, SchemaVariant::Denormalised)
        .unwrap();

    assert!(service
        .is_in_sync_with_store("Asha", SchemaVariant::Denormalised)
        .unwrap());

    // A roster seeded with a stale salary compares unequal.
    let store = FakeStore::with_records(vec![record(1, "Asha", 50000.0)]);
    let stale = PayrollService::with_roster(
        store,
        FakeStore::new(),
        FakeRosterFile::new(Vec::new()),
        vec![record(1, "Asha", 45000.0)],
    );
    assert!(!stale
        .is_in_sync_with_store("Asha", SchemaVariant::Denormalised)
        .unwrap());
}

#[test]
fn sync_check_fails_with_not_found_for_unknown_name() {
    let service = empty_service();

    let err = service
        .is_in_sync_with_store("Zoya", SchemaVariant::Denormalised)
        .unwrap_err();

    assert!(matches!(err, ServiceError::NotFound { name } if name == "Zoya"));
}

#[test]
fn records_in_date_range_delegates_to_denormalised_store() {
    let store = FakeStore::with_records(vec![
        EmployeeRecord::new(1, "Asha", 50000.0, date(2020, 1, 10), "F"),
        EmployeeRecord::new(2, "Bilal", 52000.0, date(2021, 3, 1), "M"),
        EmployeeRecord::new(3, "Mira", 48000.0, date(2022, 6, 15), "F"),
    ]);
    let service = PayrollService::new(store, FakeStore::new(), FakeRosterFile::new(Vec::new()));

    let records = service
        .records_in_date_range(date(2020, 1, 1), date(2021, 12, 31))
        .unwrap();

    let names: Vec<_> = records.iter().map(|record| record.name.as_str()).collect();
    assert_eq!(names, ["Asha", "Bilal"]);
}

#[test]
fn average_salary_by_gender_is_database_only() {
    let store = FakeStore::with_records(vec![
        EmployeeRecord::new(1, "Asha", 50000.0, date(2020, 1, 10), "F"),
        EmployeeRecord::new(2, "Bilal", 52000.0, date(2021, 3, 1), "M"),
        EmployeeRecord::new(3, "Mira", 48000.0, date(2022, 6, 15), "F"),
    ]);
    let service = PayrollService::new(store, FakeStore::new(), FakeRosterFile::new(Vec::new()));

    let averages = service.average_salary_by_gender(IoTarget::Database).unwrap();
    assert_eq!(averages.len(), 2);
    assert_eq!(averages["F"], 49000.0);
    assert_eq!(averages["M"], 52000.0);

    let err = service.average_salary_by_gender(IoTarget::File).unwrap_err();
    assert!(matches!(err, ServiceError::Unsupported { .. }));
}

#[test]
fn roster_lookups_use_first_match_when_names_collide() {
    let store = FakeStore::with_records(vec![
        record(1, "Asha", 50000.0),
        record(2, "Asha", 90000.0),
    ]);
    let mut service = PayrollService::new(store, FakeStore::new(), FakeRosterFile::new(Vec::new()));
    service
        .read_roster(IoTarget::Database, SchemaVariant::Denormalised)
        .unwrap();

    service
        .update_salary("Asha", 55000.0, UpdateMode::Direct, SchemaVariant::Denormalised)
        .unwrap();

    // Only the first roster match is reconciled in memory, even though the
    // store updated every row sharing the name.
    assert_eq!(service.roster()[0].salary, 55000.0);
    assert_eq!(service.roster()[1].salary, 90000.0);

    // The sync check also compares first against first.
    assert!(service
        .is_in_sync_with_store("Asha", SchemaVariant::Denormalised)
        .unwrap());
}

#[test]
fn add_then_update_scenario_matches_expected_roster_states() {
    let mut service = empty_service();
    assert!(service.roster().is_empty());

    service
        .add_employee(&NewEmployee::new("Asha", 50000.0, date(2020, 1, 10), "F"))
        .unwrap();
    assert_eq!(service.roster().len(), 1);

    service
        .update_salary("Asha", 55000.0, UpdateMode::Direct, SchemaVariant::Denormalised)
        .unwrap();
    assert_eq!(service.roster()[0].salary, 55000.0);

    let err = service
        .update_salary("Bilal", 1.0, UpdateMode::Direct, SchemaVariant::Denormalised)
        .unwrap_err();
    assert!(matches!(err, ServiceError::UpdateFailed { .. }));
    assert_eq!(service.roster()[0].salary, 55000.0);
}
