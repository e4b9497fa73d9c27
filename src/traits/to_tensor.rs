use burn::tensor::{backend::Backend, BasicOps, Data, Float, Int, Shape, Tensor};

use crate::game::Action;

/// A trait for converting items to tensors
///
/// Implemented for `Vec<T>` to convert batches of `T` to a tensor of dimension `D`
pub trait ToTensor<B: Backend, const D: usize, K: BasicOps<B>> {
    fn to_tensor(self, device: &B::Device) -> Tensor<B, D, K>;
}

/// Fixed-size feature vectors become the rows of a `[batch, A]` float tensor
impl<B, const A: usize> ToTensor<B, 2, Float> for Vec<[f32; A]>
where
    B: Backend,
{
    fn to_tensor(self, device: &B::Device) -> Tensor<B, 2, Float> {
        let len = self.len();
        let data = Data::new(
            self.into_iter().flatten().collect::<Vec<f32>>(),
            Shape::new([len, A]),
        );
        Tensor::from_data(data.convert(), device)
    }
}

/// Actions become a `[batch, 1]` column of output indices, ready for `gather`
impl<B: Backend> ToTensor<B, 2, Int> for Vec<Action> {
    fn to_tensor(self, device: &B::Device) -> Tensor<B, 2, Int> {
        let len = self.len();
        let data = Data::new(
            self.into_iter()
                .map(|a| a.index() as i64)
                .collect::<Vec<_>>(),
            Shape::new([len, 1]),
        );
        Tensor::from_data(data.convert(), device)
    }
}
