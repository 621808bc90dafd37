// src/services/directory_service.rs
//! Compound AND filter over the in-memory alumni list.
use serde::Deserialize;

use crate::models::{faculty, non_empty, profile::Profile};

/// Raw query string of `/alumni/directory`. Blank fields mean "no filter".
#[derive(Debug, Default, Deserialize)]
pub struct DirectoryQuery {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub faculty: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub graduation_year: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryFilter {
    pub name: Option<String>,
    pub faculty: Option<String>,
    pub department: Option<String>,
    pub graduation_year: Option<String>,
}

impl From<&DirectoryQuery> for DirectoryFilter {
    fn from(query: &DirectoryQuery) -> Self {
        DirectoryFilter {
            name: non_empty(&query.name),
            faculty: None,
            department: None,
            graduation_year: non_empty(&query.graduation_year),
        }
        .with_faculty(non_empty(&query.faculty))
        .with_department(non_empty(&query.department))
    }
}

impl DirectoryFilter {
    /// Changing the faculty always clears the department.
    pub fn with_faculty(mut self, faculty: Option<String>) -> Self {
        self.faculty = faculty;
        self.department = None;
        self
    }

    /// Only keeps a department that belongs to the selected faculty.
    pub fn with_department(mut self, department: Option<String>) -> Self {
        self.department = match (&self.faculty, department) {
            (Some(f), Some(d)) if faculty::belongs_to(f, &d) => Some(d),
            (_, Some(d)) => {
                tracing::debug!("Directory: dropping department '{}' outside the selected faculty", d);
                None
            }
            (_, None) => None,
        };
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.faculty.is_none() && self.department.is_none() && self.graduation_year.is_none()
    }

    pub fn matches(&self, alumnus: &Profile) -> bool {
        if let Some(needle) = &self.name {
            let needle = needle.to_lowercase();
            let name = alumnus.full_name().to_lowercase();
            if !name.contains(&needle) && !alumnus.email.to_lowercase().contains(&needle) {
                return false;
            }
        }
        if let Some(f) = &self.faculty {
            if alumnus.faculty.as_deref() != Some(f.as_str()) {
                return false;
            }
        }
        if let Some(d) = &self.department {
            if alumnus.department.as_deref() != Some(d.as_str()) {
                return false;
            }
        }
        if let Some(year) = &self.graduation_year {
            if alumnus.graduation_year.map(|y| y.to_string()).as_deref() != Some(year.as_str()) {
                return false;
            }
        }
        true
    }
}

/// Stable: keeps the input order.
pub fn filter<'a>(alumni: &'a [Profile], filter: &DirectoryFilter) -> Vec<&'a Profile> {
    alumni.iter().filter(|a| filter.matches(a)).collect()
}

/// Admin-panel search: substring over first name, last name, department and faculty.
pub fn search<'a>(alumni: &'a [Profile], query: &str) -> Vec<&'a Profile> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return alumni.iter().collect();
    }
    alumni
        .iter()
        .filter(|a| {
            [&a.first_name, &a.last_name, &a.department, &a.faculty]
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(&query))
        })
        .collect()
}
