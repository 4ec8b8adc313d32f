use crate::domain::todo::driven_ports::{TodoReader, TodoWriter};
use crate::domain::todo::driving_ports::TodoError;
use crate::external_connections::ExternalConnectivity;
use anyhow::Context;

/// A single todo list entry
#[derive(PartialEq, Eq, Debug)]
#[cfg_attr(test, derive(Clone))]
pub struct TodoItem {
    pub id: i32,
    pub description: String,
    pub completed: bool,
}

/// Data required to create a new todo item
#[cfg_attr(test, derive(Clone, Debug))]
pub struct NewTodo {
    pub description: String,
    pub completed: bool,
}

/// A partial update to an existing todo item. Absent fields are left untouched
#[derive(Default)]
#[cfg_attr(test, derive(Clone, Debug, PartialEq, Eq))]
pub struct UpdateTodo {
    pub description: Option<String>,
    pub completed: Option<bool>,
}

impl UpdateTodo {
    /// True if at least one field would change on apply
    pub fn has_changes(&self) -> bool {
        self.description.is_some() || self.completed.is_some()
    }
}

/// A conjunction of predicates narrowing which todo items a list query returns.
/// An empty filter matches every item
#[derive(Default, PartialEq, Eq, Debug)]
#[cfg_attr(test, derive(Clone))]
pub struct TodoFilter {
    pub completed: Option<bool>,
    pub description_contains: Option<String>,
}

impl TodoFilter {
    /// Builds a filter from the raw `completed` and `q` query parameters.
    ///
    /// `completed` only produces a predicate for the exact strings "true" and
    /// "false". Any other value is ignored rather than rejected, matching the
    /// API's long-standing behavior. `q` produces a case-insensitive substring
    /// predicate on the description when non-empty after trimming.
    pub fn from_query(completed: Option<&str>, q: Option<&str>) -> TodoFilter {
        let completed_predicate = match completed {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        };

        let description_predicate = match q {
            Some(raw_query) if !raw_query.trim().is_empty() => Some(raw_query.trim().to_owned()),
            _ => None,
        };

        TodoFilter {
            completed: completed_predicate,
            description_contains: description_predicate,
        }
    }
}

pub mod driven_ports {
    use super::*;
    use crate::external_connections::ExternalConnectivity;

    pub trait TodoReader: Sync {
        async fn find_all(
            &self,
            filter: &TodoFilter,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<TodoItem>, anyhow::Error>;

        async fn find_by_id(
            &self,
            todo_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<TodoItem>, anyhow::Error>;
    }

    pub trait TodoWriter: Sync {
        async fn create(
            &self,
            new_todo: &NewTodo,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<TodoItem, anyhow::Error>;

        /// Applies a partial update. Callers must verify the record exists first
        /// and must not invoke this with an empty update
        async fn update(
            &self,
            todo_id: i32,
            update: &UpdateTodo,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<TodoItem, anyhow::Error>;

        /// Deletes by ID, reporting the number of rows removed so callers can
        /// distinguish not-found from success without a second read
        async fn delete(
            &self,
            todo_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<u64, anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;
    use crate::external_connections::ExternalConnectivity;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum TodoError {
        #[error("The specified todo item did not exist.")]
        NotFound,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }


    pub trait TodoPort {
        async fn list(
            &self,
            filter: &TodoFilter,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_read: &impl driven_ports::TodoReader,
        ) -> Result<Vec<TodoItem>, anyhow::Error>;

        async fn get_by_id(
            &self,
            todo_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_read: &impl driven_ports::TodoReader,
        ) -> Result<Option<TodoItem>, anyhow::Error>;

        async fn create(
            &self,
            new_todo: &NewTodo,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_write: &impl driven_ports::TodoWriter,
        ) -> Result<TodoItem, anyhow::Error>;

        async fn update(
            &self,
            todo_id: i32,
            update: &UpdateTodo,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_read: &impl driven_ports::TodoReader,
            todo_write: &impl driven_ports::TodoWriter,
        ) -> Result<TodoItem, TodoError>;

        async fn delete(
            &self,
            todo_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_write: &impl driven_ports::TodoWriter,
        ) -> Result<(), TodoError>;
    }
}

pub struct TodoService {}

impl driving_ports::TodoPort for TodoService {
    async fn list(
        &self,
        filter: &TodoFilter,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_read: &impl TodoReader,
    ) -> Result<Vec<TodoItem>, anyhow::Error> {
        let matching_todos = todo_read
            .find_all(filter, &mut *ext_cxn)
            .await
            .context("listing todo items")?;

        Ok(matching_todos)
    }

    async fn get_by_id(
        &self,
        todo_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_read: &impl TodoReader,
    ) -> Result<Option<TodoItem>, anyhow::Error> {
        let todo = todo_read
            .find_by_id(todo_id, &mut *ext_cxn)
            .await
            .context("fetching a todo item by ID")?;

        Ok(todo)
    }

    async fn create(
        &self,
        new_todo: &NewTodo,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_write: &impl TodoWriter,
    ) -> Result<TodoItem, anyhow::Error> {
        // Descriptions are stored trimmed so substring search doesn't trip over
        // leading or trailing whitespace
        let trimmed_todo = NewTodo {
            description: new_todo.description.trim().to_owned(),
            completed: new_todo.completed,
        };

        let created_todo = todo_write
            .create(&trimmed_todo, &mut *ext_cxn)
            .await
            .context("creating a todo item")?;

        Ok(created_todo)
    }

    async fn update(
        &self,
        todo_id: i32,
        update: &UpdateTodo,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_read: &impl TodoReader,
        todo_write: &impl TodoWriter,
    ) -> Result<TodoItem, TodoError> {
        // Existence is checked explicitly up front so a missing record surfaces
        // as not-found rather than racing through a blind update
        let existing_todo = todo_read
            .find_by_id(todo_id, &mut *ext_cxn)
            .await
            .context("checking a todo item exists before update")?;
        let Some(existing_todo) = existing_todo else {
            return Err(TodoError::NotFound);
        };

        if !update.has_changes() {
            return Ok(existing_todo);
        }

        let updated_todo = todo_write
            .update(todo_id, update, &mut *ext_cxn)
            .await
            .context("updating a todo item")?;

        Ok(updated_todo)
    }

    async fn delete(
        &self,
        todo_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_write: &impl TodoWriter,
    ) -> Result<(), TodoError> {
        let rows_removed = todo_write
            .delete(todo_id, &mut *ext_cxn)
            .await
            .context("deleting a todo item")?;

        if rows_removed == 0 {
            return Err(TodoError::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::test_util::*;
    use super::*;
    use crate::domain::test_util::Connectivity;
    use crate::domain::todo::driving_ports::TodoPort;
    use crate::external_connections;
    use speculoos::prelude::*;
    use std::sync::RwLock;

    mod filter_from_query {
        use super::*;

        #[test]
        fn builds_equality_predicate_from_exact_true_false() {
            let true_filter = TodoFilter::from_query(Some("true"), None);
            assert_eq!(Some(true), true_filter.completed);

            let false_filter = TodoFilter::from_query(Some("false"), None);
            assert_eq!(Some(false), false_filter.completed);
        }

        #[test]
        fn ignores_unrecognized_completed_value() {
            // Deliberate leniency: bogus values leave the result set unfiltered
            let filter = TodoFilter::from_query(Some("bogus"), None);
            assert_that!(filter.completed).is_none();

            let yelling_filter = TodoFilter::from_query(Some("TRUE"), None);
            assert_that!(yelling_filter.completed).is_none();
        }

        #[test]
        fn absent_params_build_an_empty_filter() {
            let filter = TodoFilter::from_query(None, None);
            assert_eq!(TodoFilter::default(), filter);
        }

        #[test]
        fn trims_search_fragment() {
            let filter = TodoFilter::from_query(None, Some("  buy milk "));
            assert_that!(filter.description_contains)
                .is_some()
                .is_equal_to("buy milk".to_owned());
        }

        #[test]
        fn blank_search_fragment_applies_no_predicate() {
            let filter = TodoFilter::from_query(None, Some("   "));
            assert_that!(filter.description_contains).is_none();

            let empty_filter = TodoFilter::from_query(None, Some(""));
            assert_that!(empty_filter.description_contains).is_none();
        }
    }

    mod list {
        use super::*;

        #[tokio::test]
        async fn empty_filter_returns_everything() {
            let todo_persist = RwLock::new(InMemoryTodoPersistence::new_with_todos(&[
                NewTodo {
                    description: "Mow the lawn".to_owned(),
                    completed: false,
                },
                NewTodo {
                    description: "Walk the dog".to_owned(),
                    completed: true,
                },
            ]));
            let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();

            let list_result = TodoService {}
                .list(&TodoFilter::default(), &mut ext_cxn, &todo_persist)
                .await;
            assert_that!(list_result).is_ok().has_length(2);
        }

        #[tokio::test]
        async fn completed_predicate_selects_exact_subset() {
            let todo_persist = RwLock::new(InMemoryTodoPersistence::new_with_todos(&[
                NewTodo {
                    description: "Mow the lawn".to_owned(),
                    completed: false,
                },
                NewTodo {
                    description: "Walk the dog".to_owned(),
                    completed: true,
                },
                NewTodo {
                    description: "Do the dishes".to_owned(),
                    completed: true,
                },
            ]));
            let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();
            let filter = TodoFilter {
                completed: Some(true),
                description_contains: None,
            };

            let list_result = TodoService {}.list(&filter, &mut ext_cxn, &todo_persist).await;
            assert_that!(list_result).is_ok().matches(|todos| {
                todos.len() == 2 && todos.iter().all(|todo| todo.completed)
            });
        }

        #[tokio::test]
        async fn search_predicate_matches_substring_case_insensitively() {
            let todo_persist = RwLock::new(InMemoryTodoPersistence::new_with_todos(&[
                NewTodo {
                    description: "Clean the House".to_owned(),
                    completed: false,
                },
                NewTodo {
                    description: "paint the houseboat".to_owned(),
                    completed: true,
                },
                NewTodo {
                    description: "Walk the dog".to_owned(),
                    completed: false,
                },
            ]));
            let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();
            let filter = TodoFilter {
                completed: None,
                description_contains: Some("the house".to_owned()),
            };

            let list_result = TodoService {}.list(&filter, &mut ext_cxn, &todo_persist).await;
            assert_that!(list_result).is_ok().matches(|todos| {
                matches!(todos.as_slice(), [first, second] if first.id == 1 && second.id == 2)
            });
        }

        #[tokio::test]
        async fn propagates_port_error() {
            let mut raw_persist = InMemoryTodoPersistence::new();
            raw_persist.connected = Connectivity::Disconnected;
            let todo_persist = RwLock::new(raw_persist);
            let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();

            let list_result = TodoService {}
                .list(&TodoFilter::default(), &mut ext_cxn, &todo_persist)
                .await;
            assert_that!(list_result).is_err();
        }
    }

    mod get_by_id {
        use super::*;

        #[tokio::test]
        async fn happy_path() {
            let todo_persist = RwLock::new(InMemoryTodoPersistence::new_with_todos(&[
                NewTodo {
                    description: "Mow the lawn".to_owned(),
                    completed: false,
                },
                NewTodo {
                    description: "Walk the dog".to_owned(),
                    completed: true,
                },
            ]));
            let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();

            let fetch_result = TodoService {}.get_by_id(2, &mut ext_cxn, &todo_persist).await;
            assert_that!(fetch_result).is_ok().is_some().matches(|todo| {
                matches!(todo, TodoItem {
                    id: 2,
                    description,
                    completed: true,
                } if description == "Walk the dog")
            });
        }

        #[tokio::test]
        async fn happy_path_not_found() {
            let todo_persist = InMemoryTodoPersistence::new_locked();
            let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();

            let fetch_result = TodoService {}.get_by_id(41, &mut ext_cxn, &todo_persist).await;
            assert_that!(fetch_result).is_ok().is_none();
        }
    }

    mod create {
        use super::*;

        #[tokio::test]
        async fn assigns_fresh_ids() {
            let todo_persist = InMemoryTodoPersistence::new_locked();
            let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();
            let service = TodoService {};

            let first = service
                .create(
                    &NewTodo {
                        description: "buy milk".to_owned(),
                        completed: false,
                    },
                    &mut ext_cxn,
                    &todo_persist,
                )
                .await;
            assert_that!(first).is_ok().matches(|todo| {
                matches!(todo, TodoItem {
                    id: 1,
                    description,
                    completed: false,
                } if description == "buy milk")
            });

            let second = service
                .create(
                    &NewTodo {
                        description: "walk the dog".to_owned(),
                        completed: true,
                    },
                    &mut ext_cxn,
                    &todo_persist,
                )
                .await;
            assert_that!(second).is_ok().matches(|todo| todo.id == 2);
        }

        #[tokio::test]
        async fn trims_description_before_persisting() {
            let todo_persist = InMemoryTodoPersistence::new_locked();
            let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();

            let create_result = TodoService {}
                .create(
                    &NewTodo {
                        description: "  buy milk  ".to_owned(),
                        completed: false,
                    },
                    &mut ext_cxn,
                    &todo_persist,
                )
                .await;
            assert_that!(create_result)
                .is_ok()
                .matches(|todo| todo.description == "buy milk");
        }

        #[tokio::test]
        async fn propagates_port_error() {
            let mut raw_persist = InMemoryTodoPersistence::new();
            raw_persist.connected = Connectivity::Disconnected;
            let todo_persist = RwLock::new(raw_persist);
            let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();

            let create_result = TodoService {}
                .create(
                    &NewTodo {
                        description: "buy milk".to_owned(),
                        completed: false,
                    },
                    &mut ext_cxn,
                    &todo_persist,
                )
                .await;
            assert_that!(create_result).is_err();
        }
    }

    mod update {
        use super::*;

        #[tokio::test]
        async fn updating_completed_leaves_description_alone() {
            let todo_persist = RwLock::new(InMemoryTodoPersistence::new_with_todos(&[NewTodo {
                description: "Mow the lawn".to_owned(),
                completed: false,
            }]));
            let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();
            let update = UpdateTodo {
                description: None,
                completed: Some(true),
            };

            let update_result = TodoService {}
                .update(1, &update, &mut ext_cxn, &todo_persist, &todo_persist)
                .await;
            assert_that!(update_result).is_ok().matches(|todo| {
                matches!(todo, TodoItem {
                    id: 1,
                    description,
                    completed: true,
                } if description == "Mow the lawn")
            });
        }

        #[tokio::test]
        async fn updating_description_leaves_completed_alone() {
            let todo_persist = RwLock::new(InMemoryTodoPersistence::new_with_todos(&[NewTodo {
                description: "Mow the lawn".to_owned(),
                completed: true,
            }]));
            let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();
            let update = UpdateTodo {
                description: Some("Mow the back lawn".to_owned()),
                completed: None,
            };

            let update_result = TodoService {}
                .update(1, &update, &mut ext_cxn, &todo_persist, &todo_persist)
                .await;
            assert_that!(update_result).is_ok().matches(|todo| {
                matches!(todo, TodoItem {
                    id: 1,
                    description,
                    completed: true,
                } if description == "Mow the back lawn")
            });
        }

        #[tokio::test]
        async fn empty_update_returns_record_unchanged() {
            let todo_persist = RwLock::new(InMemoryTodoPersistence::new_with_todos(&[NewTodo {
                description: "Mow the lawn".to_owned(),
                completed: false,
            }]));
            let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();

            let update_result = TodoService {}
                .update(
                    1,
                    &UpdateTodo::default(),
                    &mut ext_cxn,
                    &todo_persist,
                    &todo_persist,
                )
                .await;
            assert_that!(update_result).is_ok().matches(|todo| {
                todo.description == "Mow the lawn" && !todo.completed
            });
        }

        #[tokio::test]
        async fn missing_record_reports_not_found() {
            let todo_persist = InMemoryTodoPersistence::new_locked();
            let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();
            let update = UpdateTodo {
                description: None,
                completed: Some(true),
            };

            let update_result = TodoService {}
                .update(12, &update, &mut ext_cxn, &todo_persist, &todo_persist)
                .await;
            let Err(TodoError::NotFound) = update_result else {
                panic!("Expected a not-found error, got: {update_result:#?}");
            };
        }

        #[tokio::test]
        async fn propagates_port_error() {
            let mut raw_persist = InMemoryTodoPersistence::new();
            raw_persist.connected = Connectivity::Disconnected;
            let todo_persist = RwLock::new(raw_persist);
            let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();

            let update_result = TodoService {}
                .update(
                    1,
                    &UpdateTodo {
                        description: None,
                        completed: Some(true),
                    },
                    &mut ext_cxn,
                    &todo_persist,
                    &todo_persist,
                )
                .await;
            assert_that!(update_result)
                .is_err()
                .matches(|err| matches!(err, TodoError::PortError(_)));
        }
    }

    mod delete {
        use super::*;

        #[tokio::test]
        async fn first_delete_succeeds_second_reports_not_found() {
            let todo_persist = RwLock::new(InMemoryTodoPersistence::new_with_todos(&[NewTodo {
                description: "Mow the lawn".to_owned(),
                completed: false,
            }]));
            let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();
            let service = TodoService {};

            let first_delete = service.delete(1, &mut ext_cxn, &todo_persist).await;
            assert_that!(first_delete).is_ok();

            {
                let locked_persist = todo_persist.read().expect("todo persist rw lock poisoned");
                assert_that!(locked_persist.todos).is_empty();
            }

            let second_delete = service.delete(1, &mut ext_cxn, &todo_persist).await;
            let Err(TodoError::NotFound) = second_delete else {
                panic!("Expected a not-found error, got: {second_delete:#?}");
            };
        }

        #[tokio::test]
        async fn propagates_port_error() {
            let mut raw_persist = InMemoryTodoPersistence::new();
            raw_persist.connected = Connectivity::Disconnected;
            let todo_persist = RwLock::new(raw_persist);
            let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();

            let delete_result = TodoService {}.delete(1, &mut ext_cxn, &todo_persist).await;
            assert_that!(delete_result)
                .is_err()
                .matches(|err| matches!(err, TodoError::PortError(_)));
        }
    }
}
