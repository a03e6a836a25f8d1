//! Property-based invariant tests for page geometry and the section registry.
//!
//! Verifies:
//! 1. Intersection is commutative
//! 2. Intersection is contained in both operands
//! 3. `visible_ratio` is always within `[0, 1]`
//! 4. A region fully inside the viewport has ratio 1
//! 5. A non-finite origin never overlaps anything
//! 6. Registries built from unique ids preserve order and membership

use folio_core::geometry::Rect;
use folio_core::section::SectionRegistry;
use proptest::prelude::*;

fn arb_rect() -> impl Strategy<Value = Rect> {
    (
        -2000.0f64..2000.0,
        -2000.0f64..6000.0,
        0.0f64..2000.0,
        0.0f64..2000.0,
    )
        .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

proptest! {
    #[test]
    fn intersection_commutative(a in arb_rect(), b in arb_rect()) {
        prop_assert_eq!(a.intersection_opt(&b), b.intersection_opt(&a));
    }

    #[test]
    fn intersection_inside_both(a in arb_rect(), b in arb_rect()) {
        if let Some(i) = a.intersection_opt(&b) {
            prop_assert!(i.x >= a.x && i.x >= b.x);
            prop_assert!(i.y >= a.y && i.y >= b.y);
            prop_assert!(i.right() <= a.right() + 1e-9 && i.right() <= b.right() + 1e-9);
            prop_assert!(i.bottom() <= a.bottom() + 1e-9 && i.bottom() <= b.bottom() + 1e-9);
            prop_assert!(i.area() <= a.area() + 1e-6);
        }
    }

    #[test]
    fn ratio_in_unit_interval(region in arb_rect(), viewport in arb_rect()) {
        let ratio = region.visible_ratio(&viewport);
        prop_assert!((0.0..=1.0).contains(&ratio));
    }

    #[test]
    fn contained_region_fully_visible(
        y in 0.0f64..500.0,
        h in 1.0f64..300.0,
    ) {
        let viewport = Rect::from_size(1000.0, 800.0);
        let region = Rect::new(0.0, y, 1000.0, h);
        prop_assert!((region.visible_ratio(&viewport) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn non_finite_origin_never_visible(
        region in arb_rect(),
        bad in prop::sample::select(vec![f64::NAN, f64::INFINITY, f64::NEG_INFINITY]),
        on_y in any::<bool>(),
    ) {
        let viewport = if on_y {
            Rect::new(0.0, bad, 1000.0, 800.0)
        } else {
            Rect::new(bad, 0.0, 1000.0, 800.0)
        };
        prop_assert!(region.intersection_opt(&viewport).is_none());
        prop_assert_eq!(region.visible_ratio(&viewport), 0.0);
    }

    #[test]
    fn registry_preserves_order(ids in prop::collection::btree_set("[a-z]{1,8}", 1..10)) {
        let ids: Vec<String> = ids.into_iter().collect();
        let registry = SectionRegistry::from_ids(&ids).unwrap();
        let got: Vec<&str> = registry.ids().map(|id| id.as_str()).collect();
        let want: Vec<&str> = ids.iter().map(String::as_str).collect();
        prop_assert_eq!(got, want);
        prop_assert_eq!(registry.first().id.as_str(), ids[0].as_str());
        for id in &ids {
            prop_assert!(registry.contains(id));
        }
    }
}
