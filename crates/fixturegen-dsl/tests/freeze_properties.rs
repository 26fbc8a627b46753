//! Property tests: frozen and designed values survive generation unchanged.

use std::sync::Arc;

use fixturegen_dsl::{freeze_argument, freeze_argument_ending_with, Design};
use fixturegen_engine::ResolutionContext;
use fixturegen_types::{
    ConstructorSignature, Describe, Executable, ParameterQuery, ParameterSpec, Query,
    TypeDefinition, TypeDescriptor, TypeRegistry,
};
use proptest::prelude::*;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Account {
    owner: String,
    balance: i64,
}

impl Describe for Account {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::named("Account")
    }
}

fn context() -> ResolutionContext {
    let registry = TypeRegistry::with_builtins();
    registry
        .register(
            TypeDefinition::concrete("Account").constructor(
                ConstructorSignature::new()
                    .param("owner", TypeDescriptor::of::<String>())
                    .param("balance", TypeDescriptor::of::<i64>()),
            ),
        )
        .unwrap();
    ResolutionContext::new(Arc::new(registry))
}

fn named_parameter(name: &str) -> Query {
    let spec = ParameterSpec {
        name: Some(name.to_string()),
        declared_type: TypeDescriptor::of::<u32>(),
    };
    Query::from_parameter(ParameterQuery::new(
        TypeDescriptor::of::<u32>(),
        &spec,
        0,
        Executable::Constructor {
            declaring_type: TypeDescriptor::named("Account"),
            arity: 1,
        },
    ))
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// Any frozen integer comes back exactly as frozen.
    #[test]
    fn frozen_balance_is_preserved(balance in any::<i64>()) {
        let mut context = context();
        context.apply_customizer(Arc::new(freeze_argument("balance").unwrap().to(balance).unwrap()));

        let account: Account = context.resolve_as().unwrap();
        prop_assert_eq!(account.balance, balance);
    }

    /// Any designed owner comes back exactly as designed.
    #[test]
    fn designed_owner_is_preserved(owner in "[a-zA-Z0-9 ]{0,24}") {
        let account = Design::<Account>::new()
            .set("owner", owner.clone())
            .unwrap()
            .instantiate(&context())
            .unwrap();
        prop_assert_eq!(account.owner, owner);
    }

    /// Suffix matching holds whatever the casing of the suffix.
    #[test]
    fn suffix_match_ignores_case(prefix in "[a-z]{0,8}", suffix in "[a-z]{1,8}", upper in any::<bool>()) {
        let pattern = if upper { suffix.to_uppercase() } else { suffix.clone() };
        let freezer = freeze_argument_ending_with(&pattern).unwrap().to(0).unwrap();
        let name = format!("{prefix}{suffix}");
        prop_assert!(freezer.matches(&named_parameter(&name)));
    }
}
