use langdev_simplify::{DispatchError, Dispatcher, TypeTag, Visitable};

struct Animal {
    name: &'static str,
}

struct Dog {
    animal: Animal,
}

struct Puppy {
    dog: Dog,
}

struct Pet {
    owner: &'static str,
}

/// Declares two parents: Dog first, then Pet.
struct Guide {
    dog: Dog,
    pet: Pet,
}

struct Rock;

impl Visitable for Animal {}
impl Visitable for Dog {}
impl Visitable for Puppy {}
impl Visitable for Pet {}
impl Visitable for Guide {}
impl Visitable for Rock {}

fn dog_as_animal(dog: &Dog) -> &Animal {
    &dog.animal
}

fn puppy_as_dog(puppy: &Puppy) -> &Dog {
    &puppy.dog
}

fn guide_as_dog(guide: &Guide) -> &Dog {
    &guide.dog
}

fn guide_as_pet(guide: &Guide) -> &Pet {
    &guide.pet
}

fn baduk() -> Dog {
    Dog {
        animal: Animal { name: "Baduk" },
    }
}

fn describe() -> Dispatcher<(), String> {
    let mut describe = Dispatcher::new("describe");
    describe
        .register(|animal: &Animal, _: &()| format!("animal {}", animal.name))
        .register(|pet: &Pet, _: &()| format!("pet of {}", pet.owner))
        .inherit::<Dog, Animal>(dog_as_animal)
        .inherit::<Puppy, Dog>(puppy_as_dog)
        .inherit::<Guide, Dog>(guide_as_dog)
        .inherit::<Guide, Pet>(guide_as_pet);
    describe
}

// ── Direct registration ──────────────────────────────────────────

#[test]
fn dispatches_on_exact_type() {
    let describe = describe();
    let animal = Animal { name: "Nabi" };
    assert_eq!(describe.dispatch(&animal, &()).unwrap(), "animal Nabi");
}

#[test]
fn reregistering_overwrites() {
    let mut describe = describe();
    describe.register(|animal: &Animal, _: &()| animal.name.to_uppercase());
    let animal = Animal { name: "Nabi" };
    assert_eq!(describe.dispatch(&animal, &()).unwrap(), "NABI");
}

#[test]
fn handler_receives_extra_arguments() {
    let mut greet: Dispatcher<String, String> = Dispatcher::new("greet");
    greet.register(|animal: &Animal, greeting: &String| format!("{greeting}, {}", animal.name));
    let animal = Animal { name: "Nabi" };
    assert_eq!(
        greet.dispatch(&animal, &"Hello".to_string()).unwrap(),
        "Hello, Nabi"
    );
}

// ── Ancestor fallback ────────────────────────────────────────────

#[test]
fn subtype_uses_supertype_handler() {
    let describe = describe();
    assert_eq!(describe.dispatch(&baduk(), &()).unwrap(), "animal Baduk");
}

#[test]
fn ancestor_chain_is_walked_transitively() {
    let describe = describe();
    let puppy = Puppy { dog: baduk() };
    assert_eq!(describe.dispatch(&puppy, &()).unwrap(), "animal Baduk");

    let found = describe.lookup(TypeTag::of::<Puppy>()).unwrap();
    assert_eq!(found.matched(), TypeTag::of::<Animal>());
    assert_eq!(found.depth(), 2);
}

#[test]
fn most_specific_registration_wins() {
    let mut describe = describe();
    describe.register(|_: &Dog, _: &()| "a dog".to_string());
    let puppy = Puppy { dog: baduk() };
    assert_eq!(describe.dispatch(&puppy, &()).unwrap(), "a dog");
}

#[test]
fn parents_are_searched_depth_first_left_to_right() {
    let describe = describe();
    let guide = Guide {
        dog: baduk(),
        pet: Pet { owner: "dahlia" },
    };
    // Dog is declared first and its own ancestor Animal is registered, so
    // the search never reaches Pet.
    assert_eq!(describe.dispatch(&guide, &()).unwrap(), "animal Baduk");
}

#[test]
fn later_parent_is_used_when_earlier_branch_has_no_handler() {
    let mut describe: Dispatcher<(), String> = Dispatcher::new("describe");
    describe
        .register(|pet: &Pet, _: &()| format!("pet of {}", pet.owner))
        .inherit::<Dog, Animal>(dog_as_animal)
        .inherit::<Guide, Dog>(guide_as_dog)
        .inherit::<Guide, Pet>(guide_as_pet);
    let guide = Guide {
        dog: baduk(),
        pet: Pet { owner: "dahlia" },
    };
    assert_eq!(describe.dispatch(&guide, &()).unwrap(), "pet of dahlia");
}

#[test]
fn unrelated_type_is_unregistered() {
    let describe = describe();
    let err = describe.dispatch(&Rock, &()).unwrap_err();
    match err {
        DispatchError::Unregistered { visitor, type_name } => {
            assert_eq!(visitor, "describe");
            assert!(type_name.ends_with("Rock"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!describe.contains(TypeTag::of::<Rock>()));
}

#[test]
fn unregistered_error_message_names_the_visitor() {
    let describe = describe();
    let err = describe.dispatch(&Rock, &()).unwrap_err();
    let msg = format!("{err}");
    assert!(msg.contains("Rock"));
    assert!(msg.contains("describe"));
}

#[test]
fn contains_follows_ancestors() {
    let describe = describe();
    assert!(describe.contains(TypeTag::of::<Animal>()));
    assert!(describe.contains(TypeTag::of::<Puppy>()));
}

// ── Sequence fallback ────────────────────────────────────────────

#[test]
fn collections_use_sequence_fallback() {
    let mut count: Dispatcher<(), String> = Dispatcher::new("count");
    count.register_sequence(|elements, _: &()| format!("{} items", elements.len()));
    let dogs = vec![baduk(), baduk()];
    assert_eq!(count.dispatch(&dogs, &()).unwrap(), "2 items");
}

#[test]
fn registered_collection_type_beats_sequence_fallback() {
    let mut count: Dispatcher<(), String> = Dispatcher::new("count");
    count
        .register_sequence(|_, _: &()| "fallback".to_string())
        .register(|dogs: &Vec<Dog>, _: &()| format!("{} dogs", dogs.len()));
    let dogs = vec![baduk()];
    assert_eq!(count.dispatch(&dogs, &()).unwrap(), "1 dogs");
}

#[test]
fn collections_without_fallback_are_unregistered() {
    let describe = describe();
    let dogs = vec![baduk()];
    assert!(matches!(
        describe.dispatch(&dogs, &()),
        Err(DispatchError::Unregistered { .. })
    ));
}

#[test]
fn debug_lists_registered_types() {
    let describe = describe();
    let debug = format!("{describe:?}");
    assert!(debug.contains("describe"));
    assert!(debug.contains("Animal"));
    assert!(debug.contains("Pet"));
}
