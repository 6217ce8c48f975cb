use mapnote_core::*;
use proptest::prelude::*;

fn coordinate() -> impl Strategy<Value = Coordinate> {
    (-179.0f64..179.0, -85.0f64..85.0).prop_map(|(lng, lat)| Coordinate::new(lng, lat))
}

/// Small convex-ish ring around a center; always three or more distinct vertices.
fn area() -> impl Strategy<Value = AreaGeometry> {
    (coordinate(), 3usize..8, 0.001f64..0.5).prop_map(|(center, n, radius)| {
        let vertices: Vec<Coordinate> = (0..n)
            .map(|i| {
                let t = i as f64 / n as f64 * std::f64::consts::TAU;
                Coordinate::new(center.lng + radius * t.cos(), center.lat + radius * t.sin())
            })
            .collect();
        Polygon::from_vertices(&vertices).unwrap().into()
    })
}

#[derive(Debug, Clone)]
enum Edit {
    SetPoint(Option<Coordinate>),
    SetArea(Option<AreaGeometry>),
    HidePin(bool),
}

fn edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        proptest::option::of(coordinate()).prop_map(Edit::SetPoint),
        proptest::option::of(area()).prop_map(Edit::SetArea),
        any::<bool>().prop_map(Edit::HidePin),
    ]
}

proptest! {
    #[test]
    fn kind_always_matches_geometry(
        start in coordinate(),
        edits in prop::collection::vec(edit(), 0..20)
    ) {
        let mut current = Some(MapAnnotation::pin(start));
        for e in edits {
            current = match (current, e) {
                (Some(a), Edit::SetPoint(p)) => a.with_point(p),
                (Some(a), Edit::SetArea(g)) => a.with_area(g),
                (Some(a), Edit::HidePin(h)) => Some(a.with_hide_pin(h)),
                (None, Edit::SetPoint(p)) => MapAnnotation::from_geometry(p, None),
                (None, Edit::SetArea(g)) => MapAnnotation::from_geometry(None, g),
                (None, Edit::HidePin(_)) => None,
            };
            if let Some(a) = &current {
                prop_assert!(a.check_invariants().is_ok());
                prop_assert_eq!(a.pin_center(), a.point());
                if a.point().is_none() {
                    prop_assert!(!a.hide_pin());
                }
            }
        }
    }

    #[test]
    fn hide_pin_never_touches_area(point in coordinate(), g in area(), hidden in any::<bool>()) {
        let a = MapAnnotation::pin(point).with_area(Some(g.clone())).unwrap();
        let b = a.with_hide_pin(hidden);
        prop_assert_eq!(b.area_geometry(), Some(&g));
        prop_assert_eq!(b.kind(), AnnotationKind::Both);
        prop_assert_eq!(b.hide_pin(), hidden);
    }

    #[test]
    fn centroid_lies_in_bounds(g in area()) {
        let bbox = g.bounding_box();
        prop_assert!(bbox.contains(&g.centroid()));
    }

    #[test]
    fn persisted_form_restores_geometry(
        point in coordinate(),
        g in area(),
        hidden in any::<bool>()
    ) {
        let a = MapAnnotation::pin(point)
            .with_area(Some(g))
            .unwrap()
            .with_hide_pin(hidden);
        let json = serde_json::to_string(&PersistedAnnotation::from(&a)).unwrap();
        let parsed: PersistedAnnotation = serde_json::from_str(&json).unwrap();
        let back = MapAnnotation::try_from(parsed).unwrap();
        prop_assert_eq!(back.kind(), a.kind());
        prop_assert_eq!(back.hide_pin(), a.hide_pin());
        prop_assert_eq!(
            back.area_geometry().map(|g| g.primary().vertices().len()),
            a.area_geometry().map(|g| g.primary().vertices().len())
        );
    }
}

#[test]
fn area_only_record_has_no_pin_flag() {
    let square = Polygon::from_vertices(&[
        Coordinate::new(-93.30, 44.95),
        Coordinate::new(-93.20, 44.95),
        Coordinate::new(-93.20, 45.00),
        Coordinate::new(-93.30, 45.00),
    ])
    .unwrap();
    let a = MapAnnotation::area(square.into());
    let json = serde_json::to_value(PersistedAnnotation::from(&a)).unwrap();
    assert_eq!(json["type"], "area");
    assert!(json.get("hidePin").is_none());
    assert_eq!(json["geometry"]["type"], "Polygon");
}
