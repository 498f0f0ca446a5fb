#![no_main]

use libfuzzer_sys::fuzz_target;
use scoped_di::{
    validate, FnFactory, Key, Lifetime, Requirement, ServiceDescriptor, ServiceInstance,
};

struct K0;
struct K1;
struct K2;
struct K3;

fn key(byte: u8) -> Key {
    [Key::of::<K0>(), Key::of::<K1>(), Key::of::<K2>(), Key::of::<K3>()][(byte % 4) as usize]
}

fn lifetime(byte: u8) -> Lifetime {
    match byte % 3 {
        0 => Lifetime::Singleton,
        1 => Lifetime::Scoped,
        _ => Lifetime::Transient,
    }
}

// Three bytes per descriptor: service type + lifetime, then two requirement
// slots (bit 7 set = absent, bit 6 = collection).
fuzz_target!(|data: &[u8]| {
    let descriptors: Vec<ServiceDescriptor> = data
        .chunks_exact(3)
        .take(32)
        .map(|chunk| {
            let requirements: Vec<Requirement> = chunk[1..]
                .iter()
                .filter(|&&b| b & 0x80 == 0)
                .map(|&b| {
                    if b & 0x40 != 0 {
                        Requirement::collection(key(b))
                    } else {
                        Requirement::single(key(b))
                    }
                })
                .collect();
            ServiceDescriptor::new(
                key(chunk[0]),
                lifetime(chunk[0] >> 2),
                FnFactory::new(&requirements, "fuzz", |_| Ok(ServiceInstance::of(()))),
            )
        })
        .collect();

    let count = descriptors.len();
    match validate(descriptors) {
        Ok(validated) => assert_eq!(validated.len(), count),
        Err(err) => {
            let dependency = err
                .as_dependency_error()
                .expect("validation only reports dependency errors");
            assert!(!dependency.is_empty());
            assert_eq!(err.to_string().lines().count(), dependency.len());
        }
    }
});
