use crate::model::question::Question;

/// Questions of one section, sorted by number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionGroup<'a> {
    pub name: &'a str,
    pub questions: Vec<&'a Question>,
}

/// Groups questions by section. Sections keep first-appearance order;
/// questions inside a section are sorted by `number`.
#[must_use]
pub fn group_by_section(questions: &[Question]) -> Vec<SectionGroup<'_>> {
    let mut groups: Vec<SectionGroup<'_>> = Vec::new();
    for q in questions {
        match groups.iter_mut().find(|g| g.name == q.section()) {
            Some(group) => group.questions.push(q),
            None => groups.push(SectionGroup {
                name: q.section(),
                questions: vec![q],
            }),
        }
    }
    for group in &mut groups {
        group.questions.sort_by_key(|q| q.number());
    }
    groups
}

/// Distinct section names in first-appearance order.
#[must_use]
pub fn section_names(questions: &[Question]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for q in questions {
        if !names.iter().any(|n| n == q.section()) {
            names.push(q.section().to_owned());
        }
    }
    names
}
