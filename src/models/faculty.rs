// src/models/faculty.rs
//! Faculty and department catalog used by profile forms and the directory filter.

pub const FACULTIES: &[(&str, &[&str])] = &[
    ("Faculty of Agriculture", &["Agricultural Economics", "Animal Science", "Crop Science", "Soil Science"]),
    ("Faculty of Arts", &["Arabic", "English", "History", "Islamic Studies"]),
    ("Faculty of Computing", &["Computer Science", "Information Technology", "Software Engineering", "Cyber Security"]),
    ("Faculty of Education", &["Education Administration", "Educational Psychology", "Science Education"]),
    ("Faculty of Engineering", &["Civil Engineering", "Electrical Engineering", "Mechanical Engineering"]),
    ("Faculty of Law", &["Private Law", "Public Law", "Islamic Law"]),
    ("Faculty of Medicine", &["Anatomy", "Medicine", "Nursing", "Pharmacy"]),
    ("Faculty of Science", &["Biochemistry", "Chemistry", "Mathematics", "Microbiology", "Physics"]),
    ("Faculty of Social Sciences", &["Economics", "Mass Communication", "Political Science", "Sociology"]),
];

pub fn faculty_names() -> impl Iterator<Item = &'static str> {
    FACULTIES.iter().map(|(name, _)| *name)
}

pub fn is_known(faculty: &str) -> bool {
    FACULTIES.iter().any(|(name, _)| *name == faculty)
}

/// Departments of `faculty`; empty for an unknown faculty.
pub fn departments_of(faculty: &str) -> &'static [&'static str] {
    FACULTIES
        .iter()
        .find(|(name, _)| *name == faculty)
        .map(|(_, departments)| *departments)
        .unwrap_or(&[])
}

pub fn belongs_to(faculty: &str, department: &str) -> bool {
    departments_of(faculty).contains(&department)
}

pub fn check_pair(faculty: &str, department: &str) -> Result<(), String> {
    if !is_known(faculty) {
        return Err(format!("Unknown faculty '{faculty}'."));
    }
    if !belongs_to(faculty, department) {
        return Err(format!("'{department}' is not a department of {faculty}."));
    }
    Ok(())
}
