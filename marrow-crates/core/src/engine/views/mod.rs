mod affine_view;

pub(crate) use affine_view::AffineView;
pub(crate) use affine_view::ViewTranslation;
