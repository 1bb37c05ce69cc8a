//! Employee leave ledger and its tools.
//!
//! The ledger is the shared mutable domain state of the tool host. Every
//! balance mutation is a read-modify-write under the DashMap entry guard,
//! which is exclusive per key: concurrent applications for the same employee
//! serialize, different employees proceed independently. No await happens
//! inside the critical section.

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use skillbridge_core::{
    traits::Tool,
    types::ParameterSpec,
    Error, Result,
};

/// Per-employee leave state.
#[derive(Debug, Clone, Serialize)]
pub struct LeaveRecord {
    pub balance: u32,
    pub history: Vec<String>,
}

/// Result of a successful leave application.
#[derive(Debug, Clone, Serialize)]
pub struct AppliedLeave {
    pub applied_dates: Vec<String>,
    pub days_applied: usize,
    pub remaining_balance: u32,
}

/// In-memory leave ledger keyed by employee name.
pub struct LeaveLedger {
    records: DashMap<String, LeaveRecord>,
}

impl LeaveLedger {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Ledger seeded with the sample employees.
    pub fn seeded() -> Self {
        let ledger = Self::new();
        ledger.insert("Raghu", 18, &["2025-05-13", "2025-07-03"]);
        ledger.insert(
            "Jake",
            15,
            &["2025-04-01", "2025-04-02", "2025-04-03", "2025-04-04", "2025-07-03"],
        );
        ledger.insert("Corbin", 17, &["2025-01-10", "2025-04-02", "2025-03-03"]);
        ledger.insert("Steve", 20, &[]);
        ledger
    }

    pub fn insert(&self, employee: &str, balance: u32, history: &[&str]) {
        self.records.insert(
            employee.to_string(),
            LeaveRecord {
                balance,
                history: history.iter().map(|s| s.to_string()).collect(),
            },
        );
    }

    pub fn balance(&self, employee: &str) -> Option<u32> {
        self.records.get(employee).map(|r| r.balance)
    }

    pub fn history(&self, employee: &str) -> Option<Vec<String>> {
        self.records.get(employee).map(|r| r.history.clone())
    }

    /// All employees with their records, sorted by name.
    pub fn snapshot(&self) -> Vec<(String, LeaveRecord)> {
        let mut all: Vec<_> = self
            .records
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }

    /// Apply leave for the given dates, atomically per employee.
    pub fn apply(&self, employee: &str, dates: Vec<String>) -> Result<AppliedLeave> {
        if dates.is_empty() {
            return Err(Error::validation("no valid dates provided"));
        }

        let requested = dates.len();
        let mut record = self
            .records
            .get_mut(employee)
            .ok_or_else(|| Error::tool_execution(format!("employee not found: {}", employee)))?;

        if (record.balance as usize) < requested {
            return Err(Error::tool_execution(format!(
                "insufficient leave balance: requested {} day(s) but only {} available",
                requested, record.balance
            )));
        }

        record.balance -= requested as u32;
        record.history.extend(dates.clone());

        Ok(AppliedLeave {
            applied_dates: dates,
            days_applied: requested,
            remaining_balance: record.balance,
        })
    }
}

impl Default for LeaveLedger {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a comma-separated date list, validating each as `YYYY-MM-DD`.
fn parse_dates(raw: &str) -> Result<Vec<String>> {
    let mut dates = Vec::new();
    for part in raw.split(',') {
        let trimmed = part.trim();
        if trimmed.is_empty() {
            continue;
        }
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .map_err(|_| Error::validation(format!("invalid date '{}', expected YYYY-MM-DD", trimmed)))?;
        dates.push(trimmed.to_string());
    }
    if dates.is_empty() {
        return Err(Error::validation("no valid dates provided"));
    }
    Ok(dates)
}

fn employee_arg(args: &Value) -> Result<&str> {
    args.get("employee_id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| Error::validation("employee_id is required"))
}

const EMPLOYEE_PARAM_DESC: &str = "Employee ID or name (e.g. 'Raghu', 'Jake', 'Corbin', 'Steve')";

// =============================================================================
// Leave Tools
// =============================================================================

/// Check remaining leave days for an employee.
pub struct GetLeaveBalanceTool {
    ledger: Arc<LeaveLedger>,
}

impl GetLeaveBalanceTool {
    pub fn new(ledger: Arc<LeaveLedger>) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl Tool for GetLeaveBalanceTool {
    fn name(&self) -> &str {
        "get_leave_balance"
    }

    fn description(&self) -> &str {
        "Check how many leave days are remaining for an employee"
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![ParameterSpec::required_string("employee_id", EMPLOYEE_PARAM_DESC)]
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let employee = employee_arg(&args)?;
        let balance = self
            .ledger
            .balance(employee)
            .ok_or_else(|| Error::tool_execution(format!("employee not found: {}", employee)))?;

        Ok(json!({
            "employee_id": employee,
            "balance": balance,
            "message": format!("{} has {} leave days remaining.", employee, balance),
        }))
    }
}

/// Apply leave for specific dates.
pub struct ApplyLeaveTool {
    ledger: Arc<LeaveLedger>,
}

impl ApplyLeaveTool {
    pub fn new(ledger: Arc<LeaveLedger>) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl Tool for ApplyLeaveTool {
    fn name(&self) -> &str {
        "apply_leave"
    }

    fn description(&self) -> &str {
        "Apply leave for specific dates for an employee"
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![
            ParameterSpec::required_string("employee_id", EMPLOYEE_PARAM_DESC),
            ParameterSpec::required_string(
                "leave_dates",
                "Comma-separated list of dates in YYYY-MM-DD format (e.g. '2025-04-17,2025-05-01')",
            ),
        ]
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let employee = employee_arg(&args)?;
        let raw_dates = args
            .get("leave_dates")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::validation("leave_dates is required"))?;

        let dates = parse_dates(raw_dates)?;
        let applied = self.ledger.apply(employee, dates)?;

        Ok(json!({
            "employee_id": employee,
            "applied_dates": applied.applied_dates,
            "days_applied": applied.days_applied,
            "remaining_balance": applied.remaining_balance,
            "message": format!(
                "Leave applied for {} day(s). Remaining balance: {}.",
                applied.days_applied, applied.remaining_balance
            ),
        }))
    }
}

/// Get the complete leave history for an employee.
pub struct GetLeaveHistoryTool {
    ledger: Arc<LeaveLedger>,
}

impl GetLeaveHistoryTool {
    pub fn new(ledger: Arc<LeaveLedger>) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl Tool for GetLeaveHistoryTool {
    fn name(&self) -> &str {
        "get_leave_history"
    }

    fn description(&self) -> &str {
        "Get the complete leave history for an employee"
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![ParameterSpec::required_string("employee_id", EMPLOYEE_PARAM_DESC)]
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let employee = employee_arg(&args)?;
        let history = self
            .ledger
            .history(employee)
            .ok_or_else(|| Error::tool_execution(format!("employee not found: {}", employee)))?;

        let message = if history.is_empty() {
            format!("Leave history for {}: no leaves taken.", employee)
        } else {
            format!("Leave history for {}: {}", employee, history.join(", "))
        };

        Ok(json!({
            "employee_id": employee,
            "total_leaves_taken": history.len(),
            "leave_dates": history,
            "message": message,
        }))
    }
}

/// List all employees and their current leave status.
pub struct ListEmployeesTool {
    ledger: Arc<LeaveLedger>,
}

impl ListEmployeesTool {
    pub fn new(ledger: Arc<LeaveLedger>) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl Tool for ListEmployeesTool {
    fn name(&self) -> &str {
        "list_employees"
    }

    fn description(&self) -> &str {
        "List all employees and their current leave status"
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![]
    }

    async fn execute(&self, _args: Value) -> Result<Value> {
        let snapshot = self.ledger.snapshot();
        let employees: serde_json::Map<String, Value> = snapshot
            .iter()
            .map(|(name, record)| (name.clone(), json!(record)))
            .collect();

        Ok(json!({
            "employees": employees,
            "total_employees": snapshot.len(),
        }))
    }
}
