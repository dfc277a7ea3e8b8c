use rand::seq::SliceRandom;
use rand::Rng;

/// Uniformly pick one element of `items`; None when `items` is empty
pub fn choose_random<'a, T, R>(items: &'a [T], rng: &mut R) -> Option<&'a T>
where
    R: Rng + ?Sized,
{
    items.choose(rng)
}
