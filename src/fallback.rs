//!
//! Capability-degraded fallback: the same logical operations performed one
//! row/predicate at a time against a generic object context, used when no
//! specialized provider can handle a connection. The explicit
//! `disable_default_fallback` configuration switch turns this path off
//! entirely so misconfiguration surfaces as `UnsupportedOperation` instead
//! of silently degrading to per-row work.
//!
use crate::config::VolleyConfig;
use crate::errors::{Result, VolleyError};
use crate::value::Value;

/// The generic object-context API the fallback operates against. Supplied
/// by the calling mapping layer; commits happen once per batch call through
/// `save_changes`.
pub trait ObjectContext<T> {
    fn add(&mut self, item: &T) -> Result<()>;

    /// Remove every tracked item matching the predicate, returning how many
    /// were removed.
    fn remove_where(&mut self, predicate: &dyn Fn(&T) -> bool) -> Result<u64>;

    /// Apply `apply` to every tracked item matching the predicate,
    /// returning how many were touched.
    fn mutate_where(
        &mut self,
        predicate: &dyn Fn(&T) -> bool,
        apply: &mut dyn FnMut(&mut T),
    ) -> Result<u64>;

    fn save_changes(&mut self) -> Result<u64>;
}

pub struct DeleteFallback<'a, T> {
    pub context: &'a mut dyn ObjectContext<T>,
    pub predicate: &'a dyn Fn(&T) -> bool,
}

/// Predicate plus the property accessor pair: `modifier` computes the new
/// value from the current item, `setter` writes it back.
pub struct UpdateFallback<'a, T> {
    pub context: &'a mut dyn ObjectContext<T>,
    pub predicate: &'a dyn Fn(&T) -> bool,
    pub setter: &'a dyn Fn(&mut T, Value),
    pub modifier: &'a dyn Fn(&T) -> Value,
}

fn no_provider(operation: &str) -> VolleyError {
    VolleyError::UnsupportedOperation(format!(
        "No provider supporting the {} operation for this datasource was found",
        operation
    ))
}

pub fn default_insert_all<T>(
    config: &VolleyConfig,
    context: Option<&mut dyn ObjectContext<T>>,
    items: &[T],
) -> Result<u64> {
    if config.disable_default_fallback() {
        return Err(no_provider("InsertAll"));
    }
    let context = context.ok_or_else(|| no_provider("InsertAll"))?;
    for item in items {
        context.add(item)?;
    }
    context.save_changes()?;
    Ok(items.len() as u64)
}

pub fn default_delete<T>(
    config: &VolleyConfig,
    fallback: Option<DeleteFallback<'_, T>>,
) -> Result<u64> {
    if config.disable_default_fallback() {
        return Err(no_provider("Delete"));
    }
    let fallback = fallback.ok_or_else(|| no_provider("Delete"))?;
    let count = fallback.context.remove_where(fallback.predicate)?;
    fallback.context.save_changes()?;
    Ok(count)
}

pub fn default_update<T>(
    config: &VolleyConfig,
    fallback: Option<UpdateFallback<'_, T>>,
) -> Result<u64> {
    if config.disable_default_fallback() {
        return Err(no_provider("Update"));
    }
    let UpdateFallback {
        context,
        predicate,
        setter,
        modifier,
    } = fallback.ok_or_else(|| no_provider("Update"))?;
    let mut apply = |item: &mut T| {
        let value = modifier(item);
        setter(item, value);
    };
    let count = context.mutate_where(predicate, &mut apply)?;
    context.save_changes()?;
    Ok(count)
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct User {
        id: i32,
        age: i32,
    }

    /// In-memory object context: adds stage until `save_changes`.
    #[derive(Default)]
    struct MemoryContext {
        items: Vec<User>,
        pending: Vec<User>,
        commits: usize,
    }

    impl ObjectContext<User> for MemoryContext {
        fn add(&mut self, item: &User) -> Result<()> {
            self.pending.push(item.clone());
            Ok(())
        }

        fn remove_where(&mut self, predicate: &dyn Fn(&User) -> bool) -> Result<u64> {
            let before = self.items.len();
            self.items.retain(|u| !predicate(u));
            Ok((before - self.items.len()) as u64)
        }

        fn mutate_where(
            &mut self,
            predicate: &dyn Fn(&User) -> bool,
            apply: &mut dyn FnMut(&mut User),
        ) -> Result<u64> {
            let mut count = 0;
            for item in self.items.iter_mut().filter(|u| predicate(u)) {
                apply(item);
                count += 1;
            }
            Ok(count)
        }

        fn save_changes(&mut self) -> Result<u64> {
            let count = self.pending.len() as u64;
            self.items.append(&mut self.pending);
            self.commits += 1;
            Ok(count)
        }
    }

    #[test]
    fn insert_all_adds_then_commits_once() {
        let config = VolleyConfig::default();
        let mut context = MemoryContext::default();
        let items = vec![User { id: 1, age: 10 }, User { id: 2, age: 20 }];
        let count = default_insert_all(&config, Some(&mut context), &items).unwrap();
        assert_eq!(count, 2);
        assert_eq!(context.items.len(), 2);
        assert_eq!(context.commits, 1);
    }

    #[test]
    fn disabled_fallback_refuses_without_partial_work() {
        let config = VolleyConfig::default().set_disable_default_fallback(true);
        let mut context = MemoryContext::default();
        let items = vec![User { id: 1, age: 10 }];
        let result = default_insert_all(&config, Some(&mut context), &items);
        assert!(matches!(result, Err(VolleyError::UnsupportedOperation(_))));
        assert!(context.items.is_empty());
        assert!(context.pending.is_empty());
        assert_eq!(context.commits, 0);
    }

    #[test]
    fn missing_context_is_unsupported() {
        let config = VolleyConfig::default();
        let result = default_insert_all::<User>(&config, None, &[]);
        assert!(matches!(result, Err(VolleyError::UnsupportedOperation(_))));
    }

    #[test]
    fn delete_removes_matching_items() {
        let config = VolleyConfig::default();
        let mut context = MemoryContext {
            items: vec![User { id: 1, age: 10 }, User { id: 2, age: 20 }],
            ..Default::default()
        };
        let predicate = |u: &User| u.id == 1;
        let count = default_delete(
            &config,
            Some(DeleteFallback {
                context: &mut context,
                predicate: &predicate,
            }),
        )
        .unwrap();
        assert_eq!(count, 1);
        assert_eq!(context.items, vec![User { id: 2, age: 20 }]);
    }

    #[test]
    fn update_applies_modifier_through_setter() {
        let config = VolleyConfig::default();
        let mut context = MemoryContext {
            items: vec![User { id: 1, age: 10 }, User { id: 2, age: 20 }],
            ..Default::default()
        };
        let predicate = |u: &User| u.age >= 20;
        let setter = |u: &mut User, v: Value| u.age = v.as_i64().unwrap_or_default() as i32;
        let modifier = |u: &User| Value::from(u.age + 1);
        let count = default_update(
            &config,
            Some(UpdateFallback {
                context: &mut context,
                predicate: &predicate,
                setter: &setter,
                modifier: &modifier,
            }),
        )
        .unwrap();
        assert_eq!(count, 1);
        assert_eq!(context.items[1].age, 21);
        assert_eq!(context.items[0].age, 10);
    }
}
