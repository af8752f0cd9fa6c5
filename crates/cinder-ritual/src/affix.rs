//! # Affix Application
//!
//! Affixes mutate a copy of the selected template, in bucket order. Policy
//! conflicts never fail a resolution: the affix is skipped (or clamped) and a
//! warning is recorded against its id.
//!
//! | Effect | Positive | Negative |
//! |--------|----------|----------|
//! | Charges | add, or become unlimited | subtract, floor at 1 |
//! | Cost / Product | add to match, else append | subtract, remove at zero, never the last entry |
//! | Constraint | append | append |
//! | Soulbound | set | clear |
//! | None | - | - |
//!
//! Unlimited charges are never changed.

use crate::types::{Affix, AffixEffect, Charges, Component, RitualTemplate};

/// Warnings collected while applying a sequence of affixes
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AffixWarnings(Vec<String>);

impl AffixWarnings {
    fn push(&mut self, affix_id: u64, message: &str) {
        self.0.push(format!("{message} (affix {affix_id})"));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// All warnings as one message
    pub fn joined(&self) -> String {
        self.0.join("; ")
    }
}

/// Apply `affixes` to `template` in order
pub fn apply_affixes<'a>(
    template: &mut RitualTemplate,
    affixes: impl IntoIterator<Item = (u64, &'a Affix)>,
) -> AffixWarnings {
    let mut warnings = AffixWarnings::default();
    for (affix_id, affix) in affixes {
        if let Err(message) = apply_affix(template, affix) {
            warnings.push(affix_id, message);
        }
    }
    warnings
}

/// Apply one affix; `Err` carries a warning and means the template was not changed
/// (or was clamped)
pub fn apply_affix(template: &mut RitualTemplate, affix: &Affix) -> Result<(), &'static str> {
    match &affix.effect {
        AffixEffect::None => Ok(()),
        AffixEffect::Charges(delta) => apply_charges(&mut template.charges, *delta, affix.is_positive),
        AffixEffect::Cost(component) => {
            apply_component(&mut template.costs, component, affix.is_positive, Category::Cost)
        }
        AffixEffect::Product(component) => apply_component(
            &mut template.products,
            component,
            affix.is_positive,
            Category::Product,
        ),
        AffixEffect::Constraint(constraint) => {
            template.constraints.push(*constraint);
            Ok(())
        }
        AffixEffect::Soulbound => {
            template.soulbound = affix.is_positive;
            Ok(())
        }
    }
}

fn apply_charges(charges: &mut Charges, delta: Charges, positive: bool) -> Result<(), &'static str> {
    let current = match *charges {
        Charges::Unlimited => return Err("unlimited charges cannot be modified"),
        Charges::Limited(n) => n,
    };

    if positive {
        *charges = match delta {
            Charges::Unlimited => Charges::Unlimited,
            Charges::Limited(n) => Charges::Limited(current.saturating_add(n)),
        };
        return Ok(());
    }

    let Charges::Limited(n) = delta else {
        return Err("cannot subtract unlimited charges");
    };
    match current.checked_sub(n) {
        Some(remaining) if remaining >= 1 => {
            *charges = Charges::Limited(remaining);
            Ok(())
        }
        _ => {
            *charges = Charges::Limited(1);
            Err("charges clamped to 1")
        }
    }
}

#[derive(Clone, Copy)]
enum Category {
    Cost,
    Product,
}

impl Category {
    fn missing(self) -> &'static str {
        match self {
            Self::Cost => "negative cost affix has no matching cost",
            Self::Product => "negative product affix has no matching product",
        }
    }

    fn last_entry(self) -> &'static str {
        match self {
            Self::Cost => "cannot remove the last cost",
            Self::Product => "cannot remove the last product",
        }
    }
}

fn apply_component(
    list: &mut Vec<Component>,
    component: &Component,
    positive: bool,
    category: Category,
) -> Result<(), &'static str> {
    let existing = list.iter().position(|c| c.same_asset(component));

    match (existing, positive) {
        (Some(index), true) => {
            let entry = &mut list[index];
            entry.amount = entry.amount.saturating_add(component.amount);
            Ok(())
        }
        (None, true) => {
            list.push(component.clone());
            Ok(())
        }
        (None, false) => Err(category.missing()),
        (Some(index), false) => {
            if component.amount >= list[index].amount {
                if list.len() == 1 {
                    return Err(category.last_entry());
                }
                list.remove(index);
            } else {
                list[index].amount -= component.amount;
            }
            Ok(())
        }
    }
}
