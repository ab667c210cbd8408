use menukit::domain::{Item, Menu};
use menukit::{Client, ClientConfig, DomainEventBody, EventSequenceGuard};

#[tokio::test]
async fn guard_drops_replayed_events() {
    let (client, backend) = Client::in_memory(ClientConfig::default());
    let mut rx = backend.subscribe();
    let menus = client.menus();

    let mut m = menus.create(&Menu::named("Dinner")).await.unwrap();
    m.name = "Dinner Specials".into();
    let m = menus.update(&m).await.unwrap();
    menus.delete(m.meta.id.as_ref().unwrap()).await.unwrap();

    let events: Vec<_> = (0..3).map(|_| rx.try_recv().unwrap()).collect();
    assert!(matches!(events[0].body, DomainEventBody::Created { .. }));
    assert!(matches!(events[2].body, DomainEventBody::Deleted { .. }));

    let mut guard = EventSequenceGuard::new();
    // Out of order: the update arrives first, then a stale create, then a replay.
    assert!(guard.accept(&events[1]));
    assert!(!guard.accept(&events[0]));
    assert!(!guard.accept(&events[1]));
    assert!(guard.accept(&events[2]));
    assert_eq!(guard.last_sequence(&events[2].entity_fqdn, &events[2].entity_id), Some(3));

    let updated: Menu = events[1].entity::<Menu>().unwrap().unwrap();
    assert_eq!(updated.name, "Dinner Specials");
    assert!(events[1].entity::<Item>().unwrap().is_none());
}

#[tokio::test]
async fn events_round_trip_the_wire_envelope() {
    let (client, backend) = Client::in_memory(ClientConfig::default());
    let mut rx = backend.subscribe();
    client.menus().create(&Menu::named("Brunch")).await.unwrap();
    let event = rx.try_recv().unwrap();

    let wire = serde_json::to_value(&event).unwrap();
    assert_eq!(wire["entityFqdn"], "restaurants.menus.v1.menu");
    assert_eq!(wire["entityEventSequence"], 1);
    assert_eq!(wire["createdEvent"]["entity"]["name"], "Brunch");
    let back: menukit::DomainEvent = serde_json::from_value(wire).unwrap();
    assert_eq!(back, event);
}
