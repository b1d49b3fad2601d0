//! Text renderings of employee records.

use crate::roster::Employee;

/// The text that gets embedded for one employee. Pure and deterministic.
///
/// `experience_years` is printed with `f64`'s `Display`, so whole numbers lose
/// their fraction (`4.0` renders as `4`) whatever literal the roster used.
pub fn compose_profile(employee: &Employee) -> String {
    format!(
        "ID: {}. Name: {}. Skills: {}. Experience: {} years. Projects: {}. Availability: {}",
        employee.id,
        employee.name,
        employee.skills.join(", "),
        employee.experience_years,
        employee.projects.join(", "),
        employee.availability,
    )
}

pub fn compose_profiles(employees: &[Employee]) -> Vec<String> {
    employees.iter().map(compose_profile).collect()
}

/// One bullet line of the generation prompt.
pub fn employee_line(employee: &Employee) -> String {
    format!(
        "- ID: {}, Name: {}, Skills: {}, Experience: {} years, Projects: {}, Availability: {}",
        employee.id,
        employee.name,
        employee.skills.join(", "),
        employee.experience_years,
        employee.projects.join(", "),
        employee.availability,
    )
}
