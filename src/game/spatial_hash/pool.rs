/// Smallest bucket handed out when nothing is known about a cell.
pub const MIN_BUCKET_CAPACITY: usize = 4;

/// Buckets with 2^15 or more capacity share the last class.
const SIZE_CLASSES: usize = 16;

/// Free list of cleared buckets, filed by power-of-two capacity class.
///
/// Class `k` holds buckets whose capacity is at least `2^k`, so taking from
/// class `ceil(log2(hint))` or above always satisfies the hint without growing.
pub struct BucketPool<T> {
    classes: Vec<Vec<Vec<T>>>,
    fresh_allocations: usize,
}

impl<T> Default for BucketPool<T> {
    fn default() -> Self {
        Self {
            classes: (0..SIZE_CLASSES).map(|_| Vec::new()).collect(),
            fresh_allocations: 0,
        }
    }
}

impl<T> BucketPool<T> {
    /// Take an empty bucket able to hold at least `hint` items.
    ///
    /// Falls back to a smaller pooled bucket (which will grow) before
    /// allocating a new one.
    pub fn acquire(&mut self, hint: usize) -> Vec<T> {
        let hint = hint.max(MIN_BUCKET_CAPACITY);
        let wanted = ceil_class(hint);

        let larger = (wanted..SIZE_CLASSES).find(|&c| !self.classes[c].is_empty());
        let smaller = || (0..wanted).rev().find(|&c| !self.classes[c].is_empty());
        if let Some(class) = larger.or_else(smaller) {
            if let Some(bucket) = self.classes[class].pop() {
                return bucket;
            }
        }

        self.fresh_allocations += 1;
        Vec::with_capacity(hint.next_power_of_two())
    }

    /// File a bucket for reuse. Buckets that never allocated are dropped.
    pub fn release(&mut self, mut bucket: Vec<T>) {
        bucket.clear();
        if bucket.capacity() == 0 {
            return;
        }
        self.classes[floor_class(bucket.capacity())].push(bucket);
    }

    /// Buckets currently waiting in the pool.
    pub fn pooled_buckets(&self) -> usize {
        self.classes.iter().map(Vec::len).sum()
    }

    /// Buckets the pool had to allocate because nothing suitable was pooled.
    pub fn fresh_allocations(&self) -> usize {
        self.fresh_allocations
    }
}

fn ceil_class(n: usize) -> usize {
    (n.next_power_of_two().trailing_zeros() as usize).min(SIZE_CLASSES - 1)
}

fn floor_class(n: usize) -> usize {
    ((usize::BITS - 1 - n.leading_zeros()) as usize).min(SIZE_CLASSES - 1)
}
