//! Subcommand handlers for the payroll console.
//!
//! # Responsibility
//! - Translate parsed arguments into facade calls.
//! - Prompt interactively for missing `add` fields, line by line.

use crate::{AddArgs, CountArgs, ListArgs, RangeArgs, SyncArgs, UpdateArgs, WriteArgs};
use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use payroll_core::{
    render_roster, EmployeeStore, IoTarget, NewEmployee, PayrollService, RosterFile,
    SchemaVariant,
};
use std::io::{self, Write};

pub fn handle_add<D, N, F>(service: &mut PayrollService<D, N, F>, args: &AddArgs) -> Result<()>
where
    D: EmployeeStore,
    N: EmployeeStore,
    F: RosterFile,
{
    let name = match &args.name {
        Some(name) => name.clone(),
        None => prompt("Enter employee name")?,
    };
    let salary = match args.salary {
        Some(salary) => salary,
        None => parse_salary(&prompt("Enter employee salary")?)?,
    };
    let start_date = match &args.start_date {
        Some(date) => parse_date(date)?,
        None => parse_date(&prompt("Enter start date (YYYY-MM-DD)")?)?,
    };
    let gender = match &args.gender {
        Some(gender) => gender.clone(),
        None => prompt("Enter employee gender")?,
    };

    let record = service.add_employee(&NewEmployee::new(name, salary, start_date, gender))?;
    println!(
        "added employee id={} name={} salary={:.2} start_date={} gender={}",
        record.id, record.name, record.salary, record.start_date, record.gender
    );
    Ok(())
}

pub fn handle_list<D, N, F>(service: &mut PayrollService<D, N, F>, args: &ListArgs) -> Result<()>
where
    D: EmployeeStore,
    N: EmployeeStore,
    F: RosterFile,
{
    let records = service.read_roster(args.source.into(), args.schema.into())?;
    println!("{}", render_roster(&records));
    Ok(())
}

pub fn handle_write<D, N, F>(service: &mut PayrollService<D, N, F>, args: &WriteArgs) -> Result<()>
where
    D: EmployeeStore,
    N: EmployeeStore,
    F: RosterFile,
{
    service.read_roster(IoTarget::Database, args.schema.into())?;
    service.write_roster(args.target.into())?;
    if args.target.writes_to_file() {
        println!("wrote {} records to the roster file", service.roster().len());
    }
    Ok(())
}

pub fn handle_count<D, N, F>(service: &PayrollService<D, N, F>, args: &CountArgs) -> Result<()>
where
    D: EmployeeStore,
    N: EmployeeStore,
    F: RosterFile,
{
    let count = service.count_entries(args.source.into())?;
    println!("{count}");
    Ok(())
}

pub fn handle_update<D, N, F>(
    service: &mut PayrollService<D, N, F>,
    args: &UpdateArgs,
) -> Result<()>
where
    D: EmployeeStore,
    N: EmployeeStore,
    F: RosterFile,
{
    let variant: SchemaVariant = args.schema.into();
    service.read_roster(IoTarget::Database, variant)?;
    service.update_salary(&args.name, args.salary, args.mode(), variant)?;

    let in_sync = service.is_in_sync_with_store(&args.name, variant)?;
    println!(
        "updated salary for {} to {:.2} (roster in sync: {in_sync})",
        args.name, args.salary
    );
    Ok(())
}

pub fn handle_sync<D, N, F>(service: &PayrollService<D, N, F>, args: &SyncArgs) -> Result<()>
where
    D: EmployeeStore,
    N: EmployeeStore,
    F: RosterFile,
{
    let in_sync = service.is_in_sync_with_store(&args.name, args.schema.into())?;
    if in_sync {
        println!("{} is in sync with the database", args.name);
    } else {
        println!("{} has diverged from the database", args.name);
    }
    Ok(())
}

pub fn handle_range<D, N, F>(service: &PayrollService<D, N, F>, args: &RangeArgs) -> Result<()>
where
    D: EmployeeStore,
    N: EmployeeStore,
    F: RosterFile,
{
    let from = parse_date(&args.from)?;
    let to = parse_date(&args.to)?;
    let records = service.records_in_date_range(from, to)?;
    println!("{}", render_roster(&records));
    Ok(())
}

pub fn handle_avg_salary<D, N, F>(service: &PayrollService<D, N, F>) -> Result<()>
where
    D: EmployeeStore,
    N: EmployeeStore,
    F: RosterFile,
{
    let averages = service.average_salary_by_gender(IoTarget::Database)?;
    let mut rows: Vec<_> = averages.into_iter().collect();
    rows.sort_by(|a, b| a.0.cmp(&b.0));
    for (gender, average) in rows {
        println!("gender={gender} avg_salary={average:.2}");
    }
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    let value = line.trim().to_string();
    if value.is_empty() {
        return Err(anyhow!("no value entered for `{label}`"));
    }
    Ok(value)
}

fn parse_salary(value: &str) -> Result<f64> {
    value
        .parse::<f64>()
        .with_context(|| format!("invalid salary `{value}`"))
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("invalid date `{value}`, expected YYYY-MM-DD"))
}
