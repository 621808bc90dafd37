// src/models/profile.rs
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use sqlx::FromRow;

use crate::models::{faculty as catalog, non_empty};

/// One profile row, with `is_admin` derived from `user_roles`.
#[derive(Debug, Clone, FromRow)]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub faculty: Option<String>,
    pub department: Option<String>,
    pub graduation_year: Option<i64>,
    pub alumni_id: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub profile_image_url: Option<String>,
    pub is_admin: bool,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

fn filled(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|v| !v.trim().is_empty())
}

fn or_dash(value: &Option<String>) -> &str {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => v,
        _ => "-",
    }
}

impl Profile {
    /// First name, last name, faculty, department and image all present.
    pub fn is_complete(&self) -> bool {
        filled(&self.first_name)
            && filled(&self.last_name)
            && filled(&self.faculty)
            && filled(&self.department)
            && filled(&self.profile_image_url)
    }

    pub fn full_name(&self) -> String {
        let first = self.first_name.as_deref().unwrap_or("").trim();
        let last = self.last_name.as_deref().unwrap_or("").trim();
        format!("{first} {last}").trim().to_string()
    }

    pub fn display_name(&self) -> String {
        let name = self.full_name();
        if name.is_empty() { self.email.clone() } else { name }
    }

    pub fn graduation_year_text(&self) -> String {
        self.graduation_year.map(|y| y.to_string()).unwrap_or_default()
    }

    // Template helpers
    pub fn first_name_or_empty(&self) -> &str { self.first_name.as_deref().unwrap_or("") }
    pub fn last_name_or_empty(&self) -> &str { self.last_name.as_deref().unwrap_or("") }
    pub fn faculty_or_empty(&self) -> &str { self.faculty.as_deref().unwrap_or("") }
    pub fn department_or_empty(&self) -> &str { self.department.as_deref().unwrap_or("") }
    pub fn alumni_id_or_empty(&self) -> &str { self.alumni_id.as_deref().unwrap_or("") }
    pub fn phone_or_empty(&self) -> &str { self.phone.as_deref().unwrap_or("") }
    pub fn address_or_empty(&self) -> &str { self.address.as_deref().unwrap_or("") }
    pub fn city_or_empty(&self) -> &str { self.city.as_deref().unwrap_or("") }
    pub fn state_or_empty(&self) -> &str { self.state.as_deref().unwrap_or("") }
    pub fn image_or_empty(&self) -> &str { self.profile_image_url.as_deref().unwrap_or("") }

    pub fn faculty_or_dash(&self) -> &str { or_dash(&self.faculty) }
    pub fn department_or_dash(&self) -> &str { or_dash(&self.department) }
    pub fn city_or_dash(&self) -> &str { or_dash(&self.city) }

    pub fn graduation_year_or_dash(&self) -> String {
        self.graduation_year.map(|y| y.to_string()).unwrap_or_else(|| "-".into())
    }
}

/// Derived onboarding state of a profile. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileState {
    pub is_new_user: bool,
    pub is_complete: bool,
    pub completion_percentage: u8,
}

impl ProfileState {
    /// Fields counted towards `completion_percentage`.
    pub const TRACKED_FIELDS: usize = 8;

    pub fn resolve(profile: Option<&Profile>) -> Self {
        let Some(p) = profile else {
            return Self { is_new_user: true, is_complete: false, completion_percentage: 0 };
        };

        let tracked = [
            filled(&p.first_name),
            filled(&p.last_name),
            filled(&p.phone),
            filled(&p.faculty),
            filled(&p.department),
            p.graduation_year.is_some(),
            filled(&p.alumni_id),
            filled(&p.profile_image_url),
        ];
        let populated = tracked.iter().filter(|f| **f).count();
        let percentage = (populated as f64 / Self::TRACKED_FIELDS as f64 * 100.0).round() as u8;

        Self {
            is_new_user: filled(&p.first_name) && filled(&p.last_name) && !filled(&p.faculty),
            is_complete: p.is_complete(),
            completion_percentage: percentage,
        }
    }
}

/// `POST /alumni/profile`. `is_admin` is deliberately absent; unknown fields are rejected.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileForm {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    pub alumni_id: String,
    pub graduation_year: String,
    pub faculty: String,
    pub department: String,
}

/// Validated profile fields ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub alumni_id: String,
    pub graduation_year: i64,
    pub faculty: String,
    pub department: String,
}

fn required(value: &str, label: &str, missing: &mut Vec<String>) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        missing.push(label.to_string());
    }
    trimmed.to_string()
}

pub fn parse_graduation_year(raw: &str) -> Result<i64, String> {
    let year: i64 = raw
        .trim()
        .parse()
        .map_err(|_| "Graduation year must be a number.".to_string())?;
    if !(1950..=2100).contains(&year) {
        return Err("Graduation year is out of range.".into());
    }
    Ok(year)
}

impl ProfileForm {
    pub fn validate(&self) -> Result<ProfileUpdate, String> {
        let mut missing = Vec::new();
        let first_name = required(&self.first_name, "first name", &mut missing);
        let last_name = required(&self.last_name, "last name", &mut missing);
        let phone = required(&self.phone, "phone number", &mut missing);
        let alumni_id = required(&self.alumni_id, "matriculation number", &mut missing);
        let year_raw = required(&self.graduation_year, "graduation year", &mut missing);
        let faculty = required(&self.faculty, "faculty", &mut missing);
        let department = required(&self.department, "department", &mut missing);
        if !missing.is_empty() {
            return Err(format!("Missing required fields: {}.", missing.join(", ")));
        }

        let graduation_year = parse_graduation_year(&year_raw)?;
        catalog::check_pair(&faculty, &department)?;

        Ok(ProfileUpdate {
            first_name,
            last_name,
            phone,
            address: non_empty(&self.address),
            city: non_empty(&self.city),
            state: non_empty(&self.state),
            alumni_id,
            graduation_year,
            faculty,
            department,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// `POST /register`
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub matriculation_number: String,
    pub graduation_date: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub alumni_id: String,
    pub graduation_year: i64,
}

pub fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}

impl RegisterForm {
    pub fn validate(&self) -> Result<Registration, String> {
        let email = self.email.trim();
        if !looks_like_email(email) {
            return Err("Please enter a valid email address.".into());
        }
        if self.password.chars().count() < 6 {
            return Err("Password must be at least 6 characters.".into());
        }
        if self.first_name.trim().chars().count() < 2 {
            return Err("First name must be at least 2 characters.".into());
        }
        if self.last_name.trim().chars().count() < 2 {
            return Err("Last name must be at least 2 characters.".into());
        }
        if self.matriculation_number.trim().chars().count() < 3 {
            return Err("Matriculation number must be at least 3 characters.".into());
        }
        let graduation = NaiveDate::parse_from_str(self.graduation_date.trim(), "%Y-%m-%d")
            .map_err(|_| "Graduation date is required.".to_string())?;

        Ok(Registration {
            email: email.to_lowercase(),
            password: self.password.clone(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            alumni_id: self.matriculation_number.trim().to_string(),
            graduation_year: graduation.year() as i64,
        })
    }
}

/// Admin panel form for creating an alumni account.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewAlumniForm {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub faculty: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub graduation_year: String,
    #[serde(default)]
    pub alumni_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAlumni {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub faculty: Option<String>,
    pub department: Option<String>,
    pub graduation_year: Option<i64>,
    pub alumni_id: Option<String>,
}

impl NewAlumniForm {
    pub fn validate(&self) -> Result<NewAlumni, String> {
        let email = self.email.trim();
        if !looks_like_email(email) {
            return Err("Please enter a valid email address.".into());
        }
        if self.password.chars().count() < 6 {
            return Err("Password must be at least 6 characters.".into());
        }
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err("First and last name are required.".into());
        }
        let faculty = non_empty(&self.faculty);
        let department = non_empty(&self.department);
        match (&faculty, &department) {
            (Some(f), Some(d)) => catalog::check_pair(f, d)?,
            (None, Some(_)) => return Err("Select a faculty before a department.".into()),
            (Some(f), None) if !catalog::is_known(f) => return Err("Unknown faculty.".into()),
            _ => {}
        }
        let graduation_year = match non_empty(&self.graduation_year) {
            Some(raw) => Some(parse_graduation_year(&raw)?),
            None => None,
        };

        Ok(NewAlumni {
            email: email.to_lowercase(),
            password: self.password.clone(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            faculty,
            department,
            graduation_year,
            alumni_id: non_empty(&self.alumni_id),
        })
    }
}

#[cfg(test)]
pub(crate) fn blank_profile(id: &str) -> Profile {
    Profile {
        id: id.to_string(),
        email: format!("{id}@example.com"),
        first_name: None,
        last_name: None,
        faculty: None,
        department: None,
        graduation_year: None,
        alumni_id: None,
        phone: None,
        address: None,
        city: None,
        state: None,
        profile_image_url: None,
        is_admin: false,
        created_at: None,
        updated_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_profile() -> Profile {
        Profile {
            first_name: Some("Amina".into()),
            last_name: Some("Ibrahim".into()),
            faculty: Some("Faculty of Computing".into()),
            department: Some("Computer Science".into()),
            profile_image_url: Some("/uploads/a.png".into()),
            ..blank_profile("u1")
        }
    }

    #[test]
    fn missing_row_resolves_to_new_user() {
        let state = ProfileState::resolve(None);
        assert!(state.is_new_user);
        assert!(!state.is_complete);
        assert_eq!(state.completion_percentage, 0);
    }

    #[test]
    fn name_only_profile_is_new_and_quarter_complete() {
        let profile = Profile {
            first_name: Some("Amina".into()),
            last_name: Some("Ibrahim".into()),
            ..blank_profile("u1")
        };
        let state = ProfileState::resolve(Some(&profile));
        assert!(state.is_new_user);
        assert!(!state.is_complete);
        assert_eq!(state.completion_percentage, 25);
    }

    #[test]
    fn completeness_needs_all_five_fields() {
        assert!(complete_profile().is_complete());

        let without_image = Profile { profile_image_url: None, ..complete_profile() };
        assert!(!without_image.is_complete());

        let blank_department = Profile { department: Some("   ".into()), ..complete_profile() };
        assert!(!blank_department.is_complete());
    }

    #[test]
    fn complete_profile_is_not_new() {
        let state = ProfileState::resolve(Some(&complete_profile()));
        assert!(!state.is_new_user);
        assert!(state.is_complete);
        // 5 of the 8 tracked fields
        assert_eq!(state.completion_percentage, 63);
    }

    #[test]
    fn percentage_reaches_hundred() {
        let profile = Profile {
            phone: Some("08030000000".into()),
            graduation_year: Some(2020),
            alumni_id: Some("FUD/CSC/16/1001".into()),
            ..complete_profile()
        };
        assert_eq!(ProfileState::resolve(Some(&profile)).completion_percentage, 100);
    }

    #[test]
    fn profile_form_rejects_department_outside_faculty() {
        let form = ProfileForm {
            first_name: "Amina".into(),
            last_name: "Ibrahim".into(),
            phone: "0803".into(),
            address: String::new(),
            city: "Kano".into(),
            state: String::new(),
            alumni_id: "FUD/1".into(),
            graduation_year: "2020".into(),
            faculty: "Faculty of Computing".into(),
            department: "Economics".into(),
        };
        assert!(form.validate().is_err());

        let ok = ProfileForm { department: "Computer Science".into(), ..form };
        let update = ok.validate().expect("valid form");
        assert_eq!(update.city.as_deref(), Some("Kano"));
        assert_eq!(update.address, None);
        assert_eq!(update.graduation_year, 2020);
    }

    #[test]
    fn profile_form_lists_missing_fields() {
        let form = ProfileForm {
            first_name: "Amina".into(),
            last_name: String::new(),
            phone: String::new(),
            address: String::new(),
            city: String::new(),
            state: String::new(),
            alumni_id: "FUD/1".into(),
            graduation_year: "2020".into(),
            faculty: "Faculty of Computing".into(),
            department: "Computer Science".into(),
        };
        let err = form.validate().unwrap_err();
        assert!(err.contains("last name"));
        assert!(err.contains("phone number"));
    }

    #[test]
    fn register_form_derives_graduation_year() {
        let form = RegisterForm {
            email: " Amina@Example.com ".into(),
            password: "secret1".into(),
            first_name: "Amina".into(),
            last_name: "Ibrahim".into(),
            matriculation_number: "FUD/16/001".into(),
            graduation_date: "2020-07-15".into(),
        };
        let reg = form.validate().expect("valid registration");
        assert_eq!(reg.email, "amina@example.com");
        assert_eq!(reg.graduation_year, 2020);
        assert_eq!(reg.alumni_id, "FUD/16/001");
    }

    #[test]
    fn register_form_rejects_short_password() {
        let form = RegisterForm {
            email: "amina@example.com".into(),
            password: "12345".into(),
            first_name: "Amina".into(),
            last_name: "Ibrahim".into(),
            matriculation_number: "FUD/16/001".into(),
            graduation_date: "2020-07-15".into(),
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn email_shape_check() {
        assert!(looks_like_email("a@b.co"));
        assert!(!looks_like_email("admin"));
        assert!(!looks_like_email("a@b"));
        assert!(!looks_like_email("a b@c.com"));
    }

    #[tokio::test]
    async fn smuggled_admin_flag_is_rejected() {
        use axum::{body::Body, extract::{Form, FromRequest}, http::{header, Request}};

        let body = "first_name=A&last_name=B&phone=1&alumni_id=x&graduation_year=2020\
                    &faculty=Faculty+of+Law&department=Public+Law&is_admin=true";
        let request = Request::post("/alumni/profile")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .expect("request");
        let parsed = Form::<ProfileForm>::from_request(request, &()).await;
        assert!(parsed.is_err());
    }
}
