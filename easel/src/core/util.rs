use ahash::RandomState;
use std::collections::HashMap as StdHashMap;

pub type HashMap<K, V> = StdHashMap<K, V, RandomState>;
