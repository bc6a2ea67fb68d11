//! Reference integrity for the student/course enrollment relation.
//!
//! The manager is the only code allowed to mutate `Student.courses` or
//! `Course.students`. Every mutation keeps the two sides symmetric:
//! `course.id ∈ student.courses` exactly when `student.id ∈ course.students`.
//! The two-document update is not atomic; a failed second write leaves an
//! asymmetric pair that [`EnrollmentManager::reconcile`] can repair.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::warn;

use crate::error::Error;
use crate::model::{Course, EntityId, Student};
use crate::store::{decode, encode, Collection, EntityStore};

/// Outcome of a reconcile pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    /// References to ids that no longer resolve, removed.
    pub dangling_dropped: usize,
    /// Half-edges between live records completed on the missing side.
    pub edges_completed: usize,
}

/// Maintains the bidirectional enrollment relation.
pub struct EnrollmentManager<'a> {
    store: &'a dyn EntityStore,
}

impl<'a> EnrollmentManager<'a> {
    /// Create a new manager over the given store.
    pub fn new(store: &'a dyn EntityStore) -> Self {
        Self { store }
    }

    /// Enroll a student in a course.
    ///
    /// The student is looked up before the course, so a request where both
    /// are missing reports the student. Re-enrolling is an error, not a
    /// silent success. The student side is persisted first; if the course
    /// side then fails, the pair is left asymmetric and reported rather
    /// than rolled back.
    pub fn enroll(&self, student_id: &EntityId, course_id: &EntityId) -> Result<Student, Error> {
        let mut student = self.load_student(student_id)?;
        let mut course = self.load_course(course_id)?;

        if student.courses.contains(course_id) {
            return Err(Error::AlreadyEnrolled {
                student: *student_id,
                course: *course_id,
            });
        }

        student.courses.insert(*course_id);
        course.students.insert(*student_id);

        self.save_student(&student)?;
        if let Err(err) = self.save_course(&course) {
            warn!(
                student = %student_id,
                course = %course_id,
                error = %err,
                "course side of enrollment failed; records left asymmetric"
            );
            return Err(err);
        }

        Ok(student)
    }

    /// Remove an enrollment edge.
    ///
    /// Removing an edge that does not exist is a success, not an error;
    /// only missing records are.
    pub fn unenroll(&self, student_id: &EntityId, course_id: &EntityId) -> Result<Student, Error> {
        let mut student = self.load_student(student_id)?;
        let mut course = self.load_course(course_id)?;

        student.courses.remove(course_id);
        course.students.remove(student_id);

        self.save_student(&student)?;
        if let Err(err) = self.save_course(&course) {
            warn!(
                student = %student_id,
                course = %course_id,
                error = %err,
                "course side of unenrollment failed; records left asymmetric"
            );
            return Err(err);
        }

        Ok(student)
    }

    /// Strip a course id out of every student referencing it.
    ///
    /// Invoked on course deletion. Returns how many students were touched.
    pub fn cascade_course_removal(&self, course_id: &EntityId) -> Result<usize, Error> {
        let mut touched = 0;
        for (_, bytes) in self.store.scan(Collection::Students)? {
            let mut student: Student = decode(&bytes)?;
            if student.courses.remove(course_id) {
                self.save_student(&student)?;
                touched += 1;
            }
        }
        Ok(touched)
    }

    /// Strip a student id out of every course referencing it.
    ///
    /// Invoked on student deletion. Returns how many courses were touched.
    pub fn cascade_student_removal(&self, student_id: &EntityId) -> Result<usize, Error> {
        let mut touched = 0;
        for (_, bytes) in self.store.scan(Collection::Courses)? {
            let mut course: Course = decode(&bytes)?;
            if course.students.remove(student_id) {
                self.save_course(&course)?;
                touched += 1;
            }
        }
        Ok(touched)
    }

    /// Repair pass for asymmetric references left by partial failures.
    ///
    /// References to ids that no longer resolve are dropped, then any
    /// half-edge between two live records is completed on the missing side.
    pub fn reconcile(&self) -> Result<ReconcileReport, Error> {
        let mut students: BTreeMap<EntityId, Student> = BTreeMap::new();
        for (id, bytes) in self.store.scan(Collection::Students)? {
            students.insert(id, decode(&bytes)?);
        }
        let mut courses: BTreeMap<EntityId, Course> = BTreeMap::new();
        for (id, bytes) in self.store.scan(Collection::Courses)? {
            courses.insert(id, decode(&bytes)?);
        }

        let mut report = ReconcileReport::default();
        let mut dirty_students: BTreeSet<EntityId> = BTreeSet::new();
        let mut dirty_courses: BTreeSet<EntityId> = BTreeSet::new();

        for (id, student) in students.iter_mut() {
            let before = student.courses.len();
            student.courses.retain(|course_id| courses.contains_key(course_id));
            let dropped = before - student.courses.len();
            if dropped > 0 {
                report.dangling_dropped += dropped;
                dirty_students.insert(*id);
            }
        }

        for (id, course) in courses.iter_mut() {
            let before = course.students.len();
            course.students.retain(|student_id| students.contains_key(student_id));
            let dropped = before - course.students.len();
            if dropped > 0 {
                report.dangling_dropped += dropped;
                dirty_courses.insert(*id);
            }
        }

        for (student_id, student) in &students {
            for course_id in &student.courses {
                if let Some(course) = courses.get_mut(course_id) {
                    if course.students.insert(*student_id) {
                        report.edges_completed += 1;
                        dirty_courses.insert(*course_id);
                    }
                }
            }
        }

        for (course_id, course) in &courses {
            for student_id in &course.students {
                if let Some(student) = students.get_mut(student_id) {
                    if student.courses.insert(*course_id) {
                        report.edges_completed += 1;
                        dirty_students.insert(*student_id);
                    }
                }
            }
        }

        for id in &dirty_students {
            if let Some(student) = students.get(id) {
                self.save_student(student)?;
            }
        }
        for id in &dirty_courses {
            if let Some(course) = courses.get(id) {
                self.save_course(course)?;
            }
        }

        Ok(report)
    }

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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::Utc;

    fn seed_student(store: &MemoryStore, name: &str) -> Student {
        let student = Student {
            id: EntityId::generate(),
            full_name: name.to_string(),
            email: format!("{}@test.com", name.replace(' ', ".").to_lowercase()),
            field_of_study: "CS".to_string(),
            year_of_enrollment: 2022,
            courses: BTreeSet::new(),
            created_at: Utc::now(),
        };
        store
            .put(Collection::Students, &student.id, &encode(&student).unwrap())
            .unwrap();
        student
    }

    fn seed_course(store: &MemoryStore, title: &str) -> Course {
        let course = Course {
            id: EntityId::generate(),
            title: title.to_string(),
            description: "a long enough course description".to_string(),
            duration: 60.0,
            instructor: "Dr. Y".to_string(),
            students: BTreeSet::new(),
            created_at: Utc::now(),
        };
        store
            .put(Collection::Courses, &course.id, &encode(&course).unwrap())
            .unwrap();
        course
    }

    fn load_student(store: &MemoryStore, id: &EntityId) -> Student {
        decode(&store.get(Collection::Students, id).unwrap().unwrap()).unwrap()
    }

    fn load_course(store: &MemoryStore, id: &EntityId) -> Course {
        decode(&store.get(Collection::Courses, id).unwrap().unwrap()).unwrap()
    }

    /// Both sides reference each other after enroll, neither after unenroll.
    #[test]
    fn test_enroll_and_unenroll_keep_symmetry() {
        let store = MemoryStore::new();
        let student = seed_student(&store, "Jean Dupont");
        let course = seed_course(&store, "Intro to X");
        let manager = EnrollmentManager::new(&store);

        manager.enroll(&student.id, &course.id).unwrap();
        assert!(load_student(&store, &student.id).courses.contains(&course.id));
        assert!(load_course(&store, &course.id).students.contains(&student.id));

        manager.unenroll(&student.id, &course.id).unwrap();
        assert!(load_student(&store, &student.id).courses.is_empty());
        assert!(load_course(&store, &course.id).students.is_empty());
    }

    #[test]
    fn test_double_enroll_is_rejected_once() {
        let store = MemoryStore::new();
        let student = seed_student(&store, "Jean Dupont");
        let course = seed_course(&store, "Intro to X");
        let manager = EnrollmentManager::new(&store);

        manager.enroll(&student.id, &course.id).unwrap();
        let err = manager.enroll(&student.id, &course.id).unwrap_err();
        assert!(matches!(err, Error::AlreadyEnrolled { .. }));

        // Each side still holds the edge exactly once.
        assert_eq!(load_student(&store, &student.id).courses.len(), 1);
        assert_eq!(load_course(&store, &course.id).students.len(), 1);
    }

    #[test]
    fn test_double_unenroll_is_a_no_op_success() {
        let store = MemoryStore::new();
        let student = seed_student(&store, "Jean Dupont");
        let course = seed_course(&store, "Intro to X");
        let manager = EnrollmentManager::new(&store);

        manager.enroll(&student.id, &course.id).unwrap();
        manager.unenroll(&student.id, &course.id).unwrap();
        // Second removal of the same edge succeeds and changes nothing.
        manager.unenroll(&student.id, &course.id).unwrap();
        assert!(load_student(&store, &student.id).courses.is_empty());
    }

    #[test]
    fn test_missing_student_reported_before_missing_course() {
        let store = MemoryStore::new();
        let manager = EnrollmentManager::new(&store);

        let err = manager
            .enroll(&EntityId::generate(), &EntityId::generate())
            .unwrap_err();
        assert!(matches!(err, Error::StudentNotFound(_)));
    }

    #[test]
    fn test_cascade_course_removal_touches_every_student() {
        let store = MemoryStore::new();
        let s1 = seed_student(&store, "Jean Dupont");
        let s2 = seed_student(&store, "Marie Curie");
        let course = seed_course(&store, "Intro to X");
        let manager = EnrollmentManager::new(&store);

        manager.enroll(&s1.id, &course.id).unwrap();
        manager.enroll(&s2.id, &course.id).unwrap();

        let touched = manager.cascade_course_removal(&course.id).unwrap();
        assert_eq!(touched, 2);
        assert!(load_student(&store, &s1.id).courses.is_empty());
        assert!(load_student(&store, &s2.id).courses.is_empty());
    }

    #[test]
    fn test_cascade_student_removal_clears_rosters() {
        let store = MemoryStore::new();
        let student = seed_student(&store, "Jean Dupont");
        let c1 = seed_course(&store, "Intro to X");
        let c2 = seed_course(&store, "Intro to Y");
        let manager = EnrollmentManager::new(&store);

        manager.enroll(&student.id, &c1.id).unwrap();
        manager.enroll(&student.id, &c2.id).unwrap();

        let touched = manager.cascade_student_removal(&student.id).unwrap();
        assert_eq!(touched, 2);
        assert!(load_course(&store, &c1.id).students.is_empty());
        assert!(load_course(&store, &c2.id).students.is_empty());
    }

    #[test]
    fn test_reconcile_completes_half_edges() {
        let store = MemoryStore::new();
        let mut student = seed_student(&store, "Jean Dupont");
        let course = seed_course(&store, "Intro to X");

        // Simulate a partial failure: student side written, course side not.
        student.courses.insert(course.id);
        store
            .put(Collection::Students, &student.id, &encode(&student).unwrap())
            .unwrap();

        let report = EnrollmentManager::new(&store).reconcile().unwrap();
        assert_eq!(report.edges_completed, 1);
        assert_eq!(report.dangling_dropped, 0);
        assert!(load_course(&store, &course.id).students.contains(&student.id));
    }

    #[test]
    fn test_reconcile_drops_dangling_references() {
        let store = MemoryStore::new();
        let mut student = seed_student(&store, "Jean Dupont");

        // Reference to a course that was never stored.
        student.courses.insert(EntityId::generate());
        store
            .put(Collection::Students, &student.id, &encode(&student).unwrap())
            .unwrap();

        let report = EnrollmentManager::new(&store).reconcile().unwrap();
        assert_eq!(report.dangling_dropped, 1);
        assert_eq!(report.edges_completed, 0);
        assert!(load_student(&store, &student.id).courses.is_empty());
    }

    #[test]
    fn test_reconcile_on_consistent_state_is_a_no_op() {
        let store = MemoryStore::new();
        let student = seed_student(&store, "Jean Dupont");
        let course = seed_course(&store, "Intro to X");
        let manager = EnrollmentManager::new(&store);
        manager.enroll(&student.id, &course.id).unwrap();

        let report = manager.reconcile().unwrap();
        assert_eq!(report, ReconcileReport::default());
    }
}
