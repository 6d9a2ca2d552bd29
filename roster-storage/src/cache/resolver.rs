//! Key dispatch and failure policies.

use super::generation::{CacheGeneration, IndexContext};
use roster_core::{
    EnumeratedValue, FailurePolicy, LookupError, LookupKey, RosterError, RosterResult,
    UnsupportedKey,
};

/// Resolves keys against a generation's indices and applies the configured
/// [`FailurePolicy`] on a miss.
#[derive(Debug, Clone)]
pub struct LookupResolver {
    context: IndexContext,
    policy: FailurePolicy,
}

impl LookupResolver {
    pub fn new(context: IndexContext, policy: FailurePolicy) -> Self {
        Self { context, policy }
    }

    pub fn context(&self) -> &IndexContext {
        &self.context
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Index lookup only; a miss is `Ok(None)` under every policy.
    ///
    /// Name keys build the name index on first use and may fail with
    /// `MissingNameColumn`.
    pub fn find<R>(
        &self,
        generation: &CacheGeneration<R>,
        key: &LookupKey,
    ) -> RosterResult<Option<EnumeratedValue<R>>> {
        match key {
            LookupKey::ByName(name) => Ok(generation
                .name_index(&self.context)?
                .get(name)
                .cloned()),
            LookupKey::ByNameSymbol(symbol) => Ok(generation
                .name_index(&self.context)?
                .get(symbol.as_str())
                .cloned()),
            LookupKey::ById(id) => Ok(generation.id_index().get(*id).cloned()),
            LookupKey::None => Ok(None),
        }
    }

    /// Index lookup followed by the failure policy on a miss.
    pub fn resolve<R>(
        &self,
        generation: &CacheGeneration<R>,
        key: &LookupKey,
    ) -> RosterResult<Option<EnumeratedValue<R>>> {
        match self.find(generation, key)? {
            Some(value) => Ok(Some(value)),
            None => {
                tracing::trace!(
                    type_name = self.context.type_name,
                    key = %key,
                    policy = %self.policy,
                    "Enumeration lookup missed"
                );
                self.on_miss(key)
            }
        }
    }

    /// Apply the failure policy to a key that did not resolve.
    fn on_miss<R>(&self, key: &LookupKey) -> RosterResult<Option<EnumeratedValue<R>>> {
        if self.policy.raises_on_miss(key) {
            return Err(LookupError::NotFound {
                type_name: self.context.type_name.to_string(),
                key: key.to_string(),
            }
            .into());
        }
        Ok(None)
    }

    /// Error for an input that is not a supported key kind.
    pub fn unsupported(&self, key: UnsupportedKey) -> RosterError {
        LookupError::UnsupportedKeyType {
            type_name: self.context.type_name.to_string(),
            kind: key.kind.to_string(),
        }
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::{EnumerationSet, Record, Symbol};

    fn make_generation() -> CacheGeneration<Record> {
        CacheGeneration::new(
            1,
            EnumerationSet::new(vec![
                EnumeratedValue::from_record(Record::named(1, "red"), "name"),
                EnumeratedValue::from_record(Record::named(2, "green"), "name"),
            ]),
        )
    }

    fn make_resolver(policy: FailurePolicy) -> LookupResolver {
        LookupResolver::new(
            IndexContext {
                type_name: "Color",
                name_column: "name".to_string(),
                table: "colors".to_string(),
            },
            policy,
        )
    }

    #[test]
    fn test_resolves_each_key_kind() {
        let generation = make_generation();
        let resolver = make_resolver(FailurePolicy::EnforceStrict);

        let by_name = resolver.resolve(&generation, &"red".into()).unwrap().unwrap();
        let by_symbol = resolver
            .resolve(&generation, &Symbol::new("red").into())
            .unwrap()
            .unwrap();
        let by_id = resolver.resolve(&generation, &1i64.into()).unwrap().unwrap();

        assert!(by_name.same_instance(&by_symbol));
        assert!(by_name.same_instance(&by_id));
        assert!(resolver.resolve(&generation, &LookupKey::None).unwrap().is_none());
    }

    #[test]
    fn test_strict_literals_asymmetry() {
        let generation = make_generation();
        let resolver = make_resolver(FailurePolicy::EnforceStrictLiterals);

        assert!(resolver
            .resolve(&generation, &"unknown".into())
            .unwrap()
            .is_none());

        let err = resolver.resolve(&generation, &999i64.into()).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "Lookup error: Couldn't find a Color identified by (999)"
        );

        let err = resolver
            .resolve(&generation, &Symbol::new("unknown").into())
            .unwrap_err();
        assert!(err.to_string().ends_with("identified by (:unknown)"));
    }

    #[test]
    fn test_find_never_applies_policy() {
        let generation = make_generation();
        let resolver = make_resolver(FailurePolicy::EnforceStrict);
        assert!(resolver.find(&generation, &999i64.into()).unwrap().is_none());
        assert!(resolver.find(&generation, &"unknown".into()).unwrap().is_none());
    }

    #[test]
    fn test_unsupported_names_kind() {
        let resolver = make_resolver(FailurePolicy::EnforceNone);
        let err = resolver.unsupported(UnsupportedKey { kind: "float" });
        assert_eq!(
            err,
            RosterError::Lookup(LookupError::UnsupportedKeyType {
                type_name: "Color".to_string(),
                kind: "float".to_string(),
            })
        );
    }
}
