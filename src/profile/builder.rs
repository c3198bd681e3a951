use super::category::{Category, TargetKind};
use super::targets::{CatchAll, ChangeHook, Field, HandlerOutput, Method};
use super::{CategoryTable, Named, Profile};
use crate::controls::Control;
use crate::error::SetupError;
use std::collections::hash_map::Entry;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Collects and validates the bindings of one consumer type.
///
/// Declarations are checked as they are made. The first invalid one is kept
/// and every later declaration is ignored, so [`ProfileBuilder::build`]
/// reports the earliest mistake.
pub struct ProfileBuilder<T> {
    tables: Vec<CategoryTable<T>>,
    change_hook: Option<Named<ChangeHook<T>>>,
    tags: HashSet<(String, Category)>,
    error: Option<SetupError>,
}

impl<T: Send + 'static> Default for ProfileBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> ProfileBuilder<T> {
    pub fn new() -> Self {
        Self {
            tables: Category::ALL.iter().map(|_| CategoryTable::default()).collect(),
            change_hook: None,
            tags: HashSet::new(),
            error: None,
        }
    }

    /// Assigns the event value of one control directly to a field.
    pub fn field(
        &mut self,
        member: &str,
        category: Category,
        control: impl Into<Control>,
        field: Field<T>,
    ) -> &mut Self {
        let control = control.into();
        let result = self.keyed(member, category, control).and_then(|()| {
            if field.shape() != category.value_shape() {
                return Err(SetupError::FieldShape {
                    member: member.to_string(),
                    category,
                    expected: category.value_shape(),
                    found: field.shape(),
                });
            }
            match self.tables[category.index()].fields.entry(control) {
                Entry::Occupied(existing) => Err(SetupError::DuplicateTarget {
                    member: member.to_string(),
                    previous: existing.get().member.clone(),
                    category,
                    control,
                    kind: TargetKind::Field,
                }),
                Entry::Vacant(slot) => {
                    slot.insert(Named::new(member, field));
                    Ok(())
                }
            }
        });
        self.record(result)
    }

    /// Calls a single-argument method with the event value of one control.
    pub fn method(
        &mut self,
        member: &str,
        category: Category,
        control: impl Into<Control>,
        method: Method<T>,
    ) -> &mut Self {
        let control = control.into();
        let result = self.keyed(member, category, control).and_then(|()| {
            if method.shape() != category.value_shape() {
                return Err(SetupError::MethodShape {
                    member: member.to_string(),
                    category,
                    expected: category.value_shape(),
                    found: method.shape(),
                });
            }
            match self.tables[category.index()].methods.entry(control) {
                Entry::Occupied(existing) => Err(SetupError::DuplicateTarget {
                    member: member.to_string(),
                    previous: existing.get().member.clone(),
                    category,
                    control,
                    kind: TargetKind::Method,
                }),
                Entry::Vacant(slot) => {
                    slot.insert(Named::new(member, method));
                    Ok(())
                }
            }
        });
        self.record(result)
    }

    /// Receives every event of `category` together with its identity.
    pub fn catch_all(
        &mut self,
        member: &str,
        category: Category,
        catch_all: CatchAll<T>,
    ) -> &mut Self {
        let result = self.tag(member, category).and_then(|()| {
            if catch_all.signature() != category.signature() {
                return Err(SetupError::CatchAllSignature {
                    member: member.to_string(),
                    category,
                    expected: category.signature(),
                    found: catch_all.signature(),
                });
            }
            let table = &mut self.tables[category.index()];
            if let Some(existing) = &table.catch_all {
                return Err(SetupError::DuplicateCatchAll {
                    member: member.to_string(),
                    previous: existing.member.clone(),
                    category,
                });
            }
            table.catch_all = Some(Named::new(member, catch_all));
            Ok(())
        });
        self.record(result)
    }

    /// Runs once after every event this profile handled.
    pub fn on_change<F, R>(&mut self, member: &str, hook: F) -> &mut Self
    where
        F: Fn(&mut T) -> R + Send + Sync + 'static,
        R: HandlerOutput,
    {
        let result = match &self.change_hook {
            Some(existing) => Err(SetupError::DuplicateChangeHook {
                member: member.to_string(),
                previous: existing.member.clone(),
            }),
            None => {
                let hook: ChangeHook<T> = Box::new(move |target| hook(target).into_result());
                self.change_hook = Some(Named::new(member, hook));
                Ok(())
            }
        };
        self.record(result)
    }

    /// Compiles the collected bindings for one consumer instance.
    pub fn build(self, consumer: Arc<Mutex<T>>) -> Result<Profile<T>, SetupError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let profile = Profile::from_parts(consumer, self.tables, self.change_hook);
        debug!("Built {:?}", profile);
        Ok(profile)
    }

    fn keyed(
        &mut self,
        member: &str,
        category: Category,
        control: Control,
    ) -> Result<(), SetupError> {
        self.tag(member, category)?;
        match category.identity_kind() {
            None => Err(SetupError::NotKeyed {
                member: member.to_string(),
                category,
            }),
            Some(expected) if expected != control.kind() => Err(SetupError::IdentityKind {
                member: member.to_string(),
                category,
                expected,
                found: control.kind(),
            }),
            Some(_) => Ok(()),
        }
    }

    fn tag(&mut self, member: &str, category: Category) -> Result<(), SetupError> {
        if self.error.is_some() {
            // already failed; the result is discarded by record()
            return Ok(());
        }
        if self.tags.insert((member.to_string(), category)) {
            Ok(())
        } else {
            Err(SetupError::DuplicateTag {
                member: member.to_string(),
                category,
            })
        }
    }

    fn record(&mut self, result: Result<(), SetupError>) -> &mut Self {
        if let Err(error) = result {
            self.error.get_or_insert(error);
        }
        self
    }
}
