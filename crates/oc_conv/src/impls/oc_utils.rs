impl_hash_map!(::oc_utils::hash::hashbrown::HashMap);

#[cfg(test)]
mod tests {
    use oc_utils::hash::HashMap;

    use crate::testing::{Event, RecordingSink};
    use crate::{Typed, encode};

    #[test]
    fn fixed_state_maps_encode_sorted() {
        let mut map = HashMap::<u32, bool>::zero_value();
        map.extend([(3, true), (1, false), (2, true)]);
        let mut sink = RecordingSink::default();
        encode(&mut sink, &map).unwrap();
        let keys: Vec<_> = sink
            .events
            .iter()
            .filter_map(|e| match e {
                Event::Uint(k) => Some(*k),
                _ => None,
            })
            .collect();
        assert_eq!(keys, [1, 2, 3]);
    }
}
