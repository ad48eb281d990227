#![cfg(test)]

// Property tests for RawTable kept inside the crate so they can observe
// counters and slot layout that the public map hides.

use crate::table::RawTable;
use hashbrown::HashMap;
use proptest::prelude::*;

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    GetOrDefault(usize),
    Erase(usize),
    Get(usize),
    Contains(i64),
    Mutate(usize, i32),
    Shrink,
}

fn arb_scenario(keys: impl Strategy<Value = i64>) -> impl Strategy<Value = (Vec<i64>, Vec<OpI>)> {
    proptest::collection::vec(keys, 1..=24).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            1 => idx.clone().prop_map(OpI::GetOrDefault),
            3 => idx.clone().prop_map(OpI::Erase),
            2 => idx.clone().prop_map(OpI::Get),
            1 => any::<i64>().prop_map(OpI::Contains),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => Just(OpI::Shrink),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn run(pool: &[i64], ops: Vec<OpI>) -> Result<(), TestCaseError> {
    let mut sut: RawTable<i32> = RawTable::new();
    let mut model: HashMap<i64, i32> = HashMap::new();

    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = pool[i];
                let prev = sut.insert(k, v).expect("growth keeps a free slot");
                prop_assert_eq!(prev, model.insert(k, v));
            }
            OpI::GetOrDefault(i) => {
                let k = pool[i];
                let v = *sut.get_or_insert_with(k, i32::default).expect("free slot");
                prop_assert_eq!(v, *model.entry(k).or_default());
            }
            OpI::Erase(i) => {
                let k = pool[i];
                prop_assert_eq!(sut.erase(k), model.remove(&k));
            }
            OpI::Get(i) => {
                let k = pool[i];
                prop_assert_eq!(sut.get(k), model.get(&k));
            }
            OpI::Contains(k) => {
                prop_assert_eq!(sut.contains(k), model.contains_key(&k));
            }
            OpI::Mutate(i, d) => {
                let k = pool[i];
                if let Some(v) = sut.get_mut(k) {
                    *v = v.saturating_add(d);
                    let mv = model.get_mut(&k).expect("model tracks live key");
                    *mv = mv.saturating_add(d);
                } else {
                    prop_assert!(!model.contains_key(&k));
                }
            }
            OpI::Shrink => {
                let before = sut.capacity();
                if sut.shrink() {
                    prop_assert_eq!(sut.capacity(), before / 2);
                    prop_assert_eq!(sut.filled(), sut.len());
                }
            }
        }

        // Post-conditions after each op
        sut.assert_invariants();
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
    }

    for (&k, v) in &model {
        prop_assert_eq!(sut.get(k), Some(v));
    }
    Ok(())
}

// Property: state-machine equivalence against hashbrown::HashMap over
// arbitrary keys, including negatives and extremes.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario(any::<i64>())) {
        run(&pool, ops)?;
    }
}

// Property: same invariants with every key congruent mod 1024, so all keys
// share one probe sequence and tombstones pile up along it.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario((-64i64..64).prop_map(|k| k * 1024))) {
        run(&pool, ops)?;
    }
}
