use super::Person;

/// The whole roster: an ordered registry of persons. Like the lesson list it
/// is a persistent value; commit points replace the roster held by the
/// application state with the value returned here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    persons: Vec<Person>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(persons: Vec<Person>) -> Self {
        Self { persons }
    }

    pub fn add_person(&self, person: Person) -> Roster {
        let mut persons = self.persons.clone();
        persons.push(person);
        Roster { persons }
    }

    pub fn replace_person(&self, index: usize, person: Person) -> Roster {
        debug_assert!(index < self.persons.len());
        let mut persons = self.persons.clone();
        persons[index] = person;
        Roster { persons }
    }

    pub fn remove_person(&self, index: usize) -> Roster {
        debug_assert!(index < self.persons.len());
        let mut persons = self.persons.clone();
        persons.remove(index);
        Roster { persons }
    }

    pub fn get(&self, index: usize) -> Option<&Person> {
        self.persons.get(index)
    }

    pub fn len(&self) -> usize {
        self.persons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }

    pub fn persons(&self) -> &[Person] {
        &self.persons
    }
}
