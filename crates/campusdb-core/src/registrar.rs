//! Typed operation surface the HTTP gateway calls.
//!
//! All student and course operations flow through the [`Registrar`];
//! enrollment mutations are delegated to the enrollment manager so the
//! relation stays symmetric.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;

use crate::enrollment::{EnrollmentManager, ReconcileReport};
use crate::error::Error;
use crate::model::{
    Course, CourseSummary, CourseView, EntityId, Student, StudentSummary, StudentView,
};
use crate::store::{decode, encode, Collection, EntityStore};
use crate::validate::{CourseDraft, StudentDraft, Validator};

/// Facade over the entity store, shared by all request handlers.
#[derive(Clone)]
pub struct Registrar {
    store: Arc<dyn EntityStore>,
}

impl Registrar {
    /// Create a registrar over the given store.
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Document counts per collection, for health reporting.
    pub fn counts(&self) -> Result<(usize, usize), Error> {
        Ok((
            self.store.scan(Collection::Students)?.len(),
            self.store.scan(Collection::Courses)?.len(),
        ))
    }

    /// Run the enrollment repair pass.
    pub fn reconcile(&self) -> Result<ReconcileReport, Error> {
        EnrollmentManager::new(self.store.as_ref()).reconcile()
    }

    // ----- students -----

    /// All students, courses expanded to brief summaries.
    pub fn list_students(&self) -> Result<Vec<StudentView>, Error> {
        let mut views = Vec::new();
        for (_, bytes) in self.store.scan(Collection::Students)? {
            let student: Student = decode(&bytes)?;
            views.push(self.student_view(&student, false)?);
        }
        Ok(views)
    }

    /// One student, courses expanded with instructor included.
    pub fn get_student(&self, id: &EntityId) -> Result<StudentView, Error> {
        let student = self.load_student(id)?;
        self.student_view(&student, true)
    }

    /// Validate and persist a new student.
    pub fn create_student(&self, draft: &StudentDraft) -> Result<Student, Error> {
        let fields = Validator::new(self.store.as_ref()).validate_student(draft, None)?;
        let student = Student {
            id: EntityId::generate(),
            full_name: fields.full_name,
            email: fields.email,
            field_of_study: fields.field_of_study,
            year_of_enrollment: fields.year_of_enrollment,
            courses: BTreeSet::new(),
            created_at: Utc::now(),
        };
        self.save_student(&student)?;
        Ok(student)
    }

    /// Merge the provided fields into the stored record, then revalidate
    /// the merged result as a whole.
    pub fn patch_student(&self, id: &EntityId, patch: &StudentDraft) -> Result<Student, Error> {
        let mut student = self.load_student(id)?;
        let merged = StudentDraft {
            full_name: patch.full_name.clone().or(Some(student.full_name.clone())),
            email: patch.email.clone().or(Some(student.email.clone())),
            field_of_study: patch
                .field_of_study
                .clone()
                .or(Some(student.field_of_study.clone())),
            year_of_enrollment: patch.year_of_enrollment.or(Some(student.year_of_enrollment)),
        };
        let fields = Validator::new(self.store.as_ref()).validate_student(&merged, Some(id))?;

        student.full_name = fields.full_name;
        student.email = fields.email;
        student.field_of_study = fields.field_of_study;
        student.year_of_enrollment = fields.year_of_enrollment;
        self.save_student(&student)?;
        Ok(student)
    }

    /// Overwrite the four core fields.
    ///
    /// The enrollment set and creation time are not replaceable; relation
    /// mutation stays with the enrollment manager. Presence of every field
    /// is the caller's check; shape rules are validated here.
    pub fn replace_student(&self, id: &EntityId, draft: &StudentDraft) -> Result<Student, Error> {
        let mut student = self.load_student(id)?;
        let fields = Validator::new(self.store.as_ref()).validate_student(draft, Some(id))?;

        student.full_name = fields.full_name;
        student.email = fields.email;
        student.field_of_study = fields.field_of_study;
        student.year_of_enrollment = fields.year_of_enrollment;
        self.save_student(&student)?;
        Ok(student)
    }

    /// Delete a student and clear it from every course roster.
    pub fn delete_student(&self, id: &EntityId) -> Result<(), Error> {
        if !self.store.remove(Collection::Students, id)? {
            return Err(Error::StudentNotFound(*id));
        }
        EnrollmentManager::new(self.store.as_ref()).cascade_student_removal(id)?;
        Ok(())
    }

    /// Enroll a student in a course, returning the refreshed detail view.
    pub fn enroll(&self, student_id: &EntityId, course_id: &EntityId) -> Result<StudentView, Error> {
        let student = EnrollmentManager::new(self.store.as_ref()).enroll(student_id, course_id)?;
        self.student_view(&student, true)
    }

    /// Remove an enrollment edge, returning the refreshed detail view.
    pub fn unenroll(
        &self,
        student_id: &EntityId,
        course_id: &EntityId,
    ) -> Result<StudentView, Error> {
        let student = EnrollmentManager::new(self.store.as_ref()).unenroll(student_id, course_id)?;
        self.student_view(&student, true)
    }

    // ----- courses -----

    /// All courses, rosters expanded to brief summaries.
    pub fn list_courses(&self) -> Result<Vec<CourseView>, Error> {
        let mut views = Vec::new();
        for (_, bytes) in self.store.scan(Collection::Courses)? {
            let course: Course = decode(&bytes)?;
            views.push(self.course_view(&course, false)?);
        }
        Ok(views)
    }

    /// One course, roster expanded with enrollment year included.
    pub fn get_course(&self, id: &EntityId) -> Result<CourseView, Error> {
        let course = self.load_course(id)?;
        self.course_view(&course, true)
    }

    /// Validate and persist a new course.
    pub fn create_course(&self, draft: &CourseDraft) -> Result<Course, Error> {
        let fields = Validator::new(self.store.as_ref()).validate_course(draft)?;
        let course = Course {
            id: EntityId::generate(),
            title: fields.title,
            description: fields.description,
            duration: fields.duration,
            instructor: fields.instructor,
            students: BTreeSet::new(),
            created_at: Utc::now(),
        };
        self.save_course(&course)?;
        Ok(course)
    }

    /// Merge the provided fields into the stored record, then revalidate.
    pub fn patch_course(&self, id: &EntityId, patch: &CourseDraft) -> Result<Course, Error> {
        let mut course = self.load_course(id)?;
        let merged = CourseDraft {
            title: patch.title.clone().or(Some(course.title.clone())),
            description: patch
                .description
                .clone()
                .or(Some(course.description.clone())),
            duration: patch.duration.or(Some(course.duration)),
            instructor: patch.instructor.clone().or(Some(course.instructor.clone())),
        };
        let fields = Validator::new(self.store.as_ref()).validate_course(&merged)?;

        course.title = fields.title;
        course.description = fields.description;
        course.duration = fields.duration;
        course.instructor = fields.instructor;
        self.save_course(&course)?;
        Ok(course)
    }

    /// Overwrite the four core fields; roster and creation time stay.
    pub fn replace_course(&self, id: &EntityId, draft: &CourseDraft) -> Result<Course, Error> {
        let mut course = self.load_course(id)?;
        let fields = Validator::new(self.store.as_ref()).validate_course(draft)?;

        course.title = fields.title;
        course.description = fields.description;
        course.duration = fields.duration;
        course.instructor = fields.instructor;
        self.save_course(&course)?;
        Ok(course)
    }

    /// Delete a course and strip it from every enrolled student.
    ///
    /// Returns how many students the cascade touched.
    pub fn delete_course(&self, id: &EntityId) -> Result<usize, Error> {
        if !self.store.remove(Collection::Courses, id)? {
            return Err(Error::CourseNotFound(*id));
        }
        EnrollmentManager::new(self.store.as_ref()).cascade_course_removal(id)
    }

    // ----- helpers -----

    fn load_student(&self, id: &EntityId) -> Result<Student, Error> {
        match self.store.get(Collection::Students, id)? {
            Some(bytes) => decode(&bytes),
            None => Err(Error::StudentNotFound(*id)),
        }
    }

    fn load_course(&self, id: &EntityId) -> Result<Course, Error> {
        match self.store.get(Collection::Courses, id)? {
            Some(bytes) => decode(&bytes),
            None => Err(Error::CourseNotFound(*id)),
        }
    }

    fn save_student(&self, student: &Student) -> Result<(), Error> {
        self.store
            .put(Collection::Students, &student.id, &encode(student)?)
    }

    fn save_course(&self, course: &Course) -> Result<(), Error> {
        self.store
            .put(Collection::Courses, &course.id, &encode(course)?)
    }

    fn student_view(&self, student: &Student, detail: bool) -> Result<StudentView, Error> {
        let mut courses = Vec::new();
        for course_id in &student.courses {
            // A reference whose target is gone (partial-failure leftover) is
            // skipped here and left for the reconcile pass.
            if let Some(bytes) = self.store.get(Collection::Courses, course_id)? {
                let course: Course = decode(&bytes)?;
                courses.push(if detail {
                    CourseSummary::detailed(&course)
                } else {
                    CourseSummary::brief(&course)
                });
            }
        }

        Ok(StudentView {
            id: student.id,
            full_name: student.full_name.clone(),
            email: student.email.clone(),
            field_of_study: student.field_of_study.clone(),
            year_of_enrollment: student.year_of_enrollment,
            courses,
            created_at: student.created_at,
        })
    }

    fn course_view(&self, course: &Course, detail: bool) -> Result<CourseView, Error> {
        let mut students = Vec::new();
        for student_id in &course.students {
            if let Some(bytes) = self.store.get(Collection::Students, student_id)? {
                let student: Student = decode(&bytes)?;
                students.push(if detail {
                    StudentSummary::detailed(&student)
                } else {
                    StudentSummary::brief(&student)
                });
            }
        }

        Ok(CourseView {
            id: course.id,
            title: course.title.clone(),
            description: course.description.clone(),
            duration: course.duration,
            instructor: course.instructor.clone(),
            students,
            created_at: course.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn registrar() -> Registrar {
        Registrar::new(Arc::new(MemoryStore::new()))
    }

    fn student_draft() -> StudentDraft {
        StudentDraft {
            full_name: Some("Jean Dupont".to_string()),
            email: Some("jean@test.com".to_string()),
            field_of_study: Some("CS".to_string()),
            year_of_enrollment: Some(2022),
        }
    }

    fn course_draft() -> CourseDraft {
        CourseDraft {
            title: Some("Intro to X".to_string()),
            description: Some("a".repeat(20)),
            duration: Some(60.0),
            instructor: Some("Dr. Y".to_string()),
        }
    }

    #[test]
    fn test_create_get_delete_student() {
        let registrar = registrar();
        let student = registrar.create_student(&student_draft()).unwrap();

        let view = registrar.get_student(&student.id).unwrap();
        assert_eq!(view.full_name, "Jean Dupont");
        assert!(view.courses.is_empty());

        registrar.delete_student(&student.id).unwrap();
        assert!(matches!(
            registrar.get_student(&student.id),
            Err(Error::StudentNotFound(_))
        ));
    }

    #[test]
    fn test_create_student_rejects_duplicate_email() {
        let registrar = registrar();
        registrar.create_student(&student_draft()).unwrap();

        let err = registrar.create_student(&student_draft()).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_patch_merges_and_revalidates() {
        let registrar = registrar();
        let student = registrar.create_student(&student_draft()).unwrap();

        let patched = registrar
            .patch_student(
                &student.id,
                &StudentDraft {
                    field_of_study: Some("Mathematics".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(patched.field_of_study, "Mathematics");
        assert_eq!(patched.email, "jean@test.com");

        // A patch that breaks a rule on an untouched-by-merge field fails.
        let err = registrar
            .patch_student(
                &student.id,
                &StudentDraft {
                    year_of_enrollment: Some(2010),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_patch_keeps_own_email() {
        let registrar = registrar();
        let student = registrar.create_student(&student_draft()).unwrap();

        // Re-submitting the stored email must not collide with itself.
        let patched = registrar
            .patch_student(
                &student.id,
                &StudentDraft {
                    email: Some("jean@test.com".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(patched.email, "jean@test.com");
    }

    #[test]
    fn test_replace_preserves_enrollment_and_creation_time() {
        let registrar = registrar();
        let student = registrar.create_student(&student_draft()).unwrap();
        let course = registrar.create_course(&course_draft()).unwrap();
        registrar.enroll(&student.id, &course.id).unwrap();

        let mut replacement = student_draft();
        replacement.full_name = Some("Jean-Pierre Dupont".to_string());
        let replaced = registrar.replace_student(&student.id, &replacement).unwrap();

        assert_eq!(replaced.full_name, "Jean-Pierre Dupont");
        assert_eq!(replaced.created_at, student.created_at);
        assert!(replaced.courses.contains(&course.id));
    }

    #[test]
    fn test_enroll_expands_course_summaries() {
        let registrar = registrar();
        let student = registrar.create_student(&student_draft()).unwrap();
        let course = registrar.create_course(&course_draft()).unwrap();

        let view = registrar.enroll(&student.id, &course.id).unwrap();
        assert_eq!(view.courses.len(), 1);
        assert_eq!(view.courses[0].title, "Intro to X");
        assert_eq!(view.courses[0].instructor.as_deref(), Some("Dr. Y"));
    }

    #[test]
    fn test_list_students_uses_brief_summaries() {
        let registrar = registrar();
        let student = registrar.create_student(&student_draft()).unwrap();
        let course = registrar.create_course(&course_draft()).unwrap();
        registrar.enroll(&student.id, &course.id).unwrap();

        let views = registrar.list_students().unwrap();
        assert_eq!(views.len(), 1);
        assert!(views[0].courses[0].instructor.is_none());
    }

    #[test]
    fn test_delete_course_cascades() {
        let registrar = registrar();
        let s1 = registrar.create_student(&student_draft()).unwrap();
        let mut other = student_draft();
        other.email = Some("marie@test.com".to_string());
        other.full_name = Some("Marie Curie Dupont".to_string());
        let s2 = registrar.create_student(&other).unwrap();
        let course = registrar.create_course(&course_draft()).unwrap();

        registrar.enroll(&s1.id, &course.id).unwrap();
        registrar.enroll(&s2.id, &course.id).unwrap();

        let touched = registrar.delete_course(&course.id).unwrap();
        assert_eq!(touched, 2);
        assert!(registrar.get_student(&s1.id).unwrap().courses.is_empty());
        assert!(registrar.get_student(&s2.id).unwrap().courses.is_empty());
    }

    #[test]
    fn test_delete_student_cascades_to_rosters() {
        let registrar = registrar();
        let student = registrar.create_student(&student_draft()).unwrap();
        let course = registrar.create_course(&course_draft()).unwrap();
        registrar.enroll(&student.id, &course.id).unwrap();

        registrar.delete_student(&student.id).unwrap();
        assert!(registrar.get_course(&course.id).unwrap().students.is_empty());
    }

    #[test]
    fn test_delete_missing_course_is_not_found() {
        let registrar = registrar();
        assert!(matches!(
            registrar.delete_course(&EntityId::generate()),
            Err(Error::CourseNotFound(_))
        ));
    }

    #[test]
    fn test_course_views_expand_rosters() {
        let registrar = registrar();
        let student = registrar.create_student(&student_draft()).unwrap();
        let course = registrar.create_course(&course_draft()).unwrap();
        registrar.enroll(&student.id, &course.id).unwrap();

        let list = registrar.list_courses().unwrap();
        assert_eq!(list[0].students.len(), 1);
        assert!(list[0].students[0].year_of_enrollment.is_none());

        let detail = registrar.get_course(&course.id).unwrap();
        assert_eq!(detail.students[0].year_of_enrollment, Some(2022));
    }

    #[test]
    fn test_counts() {
        let registrar = registrar();
        registrar.create_student(&student_draft()).unwrap();
        registrar.create_course(&course_draft()).unwrap();
        assert_eq!(registrar.counts().unwrap(), (1, 1));
    }
}
