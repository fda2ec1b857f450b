//! Batched tensor kernels for the Euler equations.
//!
//! Every function processes all elements at once. Field tensors have shape
//! `[K, np]` (volume) or `[K, 6 nfp]` (faces).

use burn::prelude::*;

use crate::equations::N_FIELDS;

/// Conserved fields (ρ, ρu, ρv, ρw, E), one tensor each.
pub type Fields<B> = [Tensor<B, 2>; N_FIELDS];

/// Split a flat `[K][field][stride]` buffer into per-field `[K, stride]` tensors.
pub fn split_fields<B: Backend>(buffer: &Tensor<B, 1>, n_elements: usize, stride: usize) -> Fields<B> {
    let blocked = buffer.clone().reshape([n_elements, N_FIELDS, stride]);
    std::array::from_fn(|f| {
        blocked
            .clone()
            .slice([0..n_elements, f..f + 1, 0..stride])
            .reshape([n_elements, stride])
    })
}

/// Inverse of [`split_fields`].
pub fn join_fields<B: Backend>(fields: Fields<B>, n_elements: usize, stride: usize) -> Tensor<B, 1> {
    let blocks: Vec<Tensor<B, 3>> = fields
        .into_iter()
        .map(|t| t.reshape([n_elements, 1, stride]))
        .collect();
    Tensor::cat(blocks, 1).reshape([n_elements * N_FIELDS * stride])
}

/// Velocity components and pressure.
fn primitives<B: Backend>(q: &Fields<B>, gamma: f64) -> ([Tensor<B, 2>; 3], Tensor<B, 2>) {
    let [rho, mu, mv, mw, energy] = q.clone();
    let u = mu.clone().div(rho.clone());
    let v = mv.clone().div(rho.clone());
    let w = mw.clone().div(rho);
    let kinetic = mu.mul(u.clone()).add(mv.mul(v.clone())).add(mw.mul(w.clone()));
    let p = energy.sub(kinetic.mul_scalar(0.5)).mul_scalar(gamma - 1.0);
    ([u, v, w], p)
}

/// Cartesian Euler fluxes F_d for d = x, y, z.
pub fn euler_fluxes<B: Backend>(q: &Fields<B>, gamma: f64) -> [Fields<B>; 3] {
    let (vel, p) = primitives(q, gamma);
    let [rho, mu, mv, mw, energy] = q.clone();
    let enthalpy = energy.add(p.clone());
    std::array::from_fn(|d| {
        let ud = vel[d].clone();
        let mut flux: Fields<B> = [
            rho.clone().mul(ud.clone()),
            mu.clone().mul(ud.clone()),
            mv.clone().mul(ud.clone()),
            mw.clone().mul(ud.clone()),
            enthalpy.clone().mul(ud),
        ];
        flux[1 + d] = flux[1 + d].clone().add(p.clone());
        flux
    })
}

/// Flux through unit normal `n` and the largest wave speed along it.
fn normal_flux<B: Backend>(q: &Fields<B>, n: &[Tensor<B, 2>; 3], gamma: f64) -> (Fields<B>, Tensor<B, 2>) {
    let (vel, p) = primitives(q, gamma);
    let [rho, mu, mv, mw, energy] = q.clone();
    let un = vel[0]
        .clone()
        .mul(n[0].clone())
        .add(vel[1].clone().mul(n[1].clone()))
        .add(vel[2].clone().mul(n[2].clone()));
    let sound = p
        .clone()
        .clamp_min(0.0)
        .mul_scalar(gamma)
        .div(rho.clone())
        .sqrt();
    let lambda = un.clone().abs().add(sound);
    let flux = [
        rho.mul(un.clone()),
        mu.mul(un.clone()).add(p.clone().mul(n[0].clone())),
        mv.mul(un.clone()).add(p.clone().mul(n[1].clone())),
        mw.mul(un.clone()).add(p.clone().mul(n[2].clone())),
        energy.add(p).mul(un),
    ];
    (flux, lambda)
}

/// Local Lax-Friedrichs flux ½(F⁻ + F⁺)·n - (τ/2) λ_max (q⁺ - q⁻).
pub fn lax_friedrichs<B: Backend>(
    q_minus: &Fields<B>,
    q_plus: &Fields<B>,
    n: &[Tensor<B, 2>; 3],
    gamma: f64,
    tau: f64,
) -> Fields<B> {
    let (f_minus, l_minus) = normal_flux(q_minus, n, gamma);
    let (f_plus, l_plus) = normal_flux(q_plus, n, gamma);
    // max(a, b) = ½ (a + b + |a - b|)
    let lambda = l_minus
        .clone()
        .add(l_plus.clone())
        .add(l_minus.sub(l_plus).abs())
        .mul_scalar(0.5);
    let penalty = lambda.mul_scalar(0.5 * tau);
    std::array::from_fn(|f| {
        f_minus[f]
            .clone()
            .add(f_plus[f].clone())
            .mul_scalar(0.5)
            .sub(q_plus[f].clone().sub(q_minus[f].clone()).mul(penalty.clone()))
    })
}

/// Kinetic energy density ½|ρu|²/ρ.
pub fn kinetic_energy<B: Backend>(q: &Fields<B>) -> Tensor<B, 2> {
    let [rho, mu, mv, mw, _] = q.clone();
    mu.clone()
        .mul(mu)
        .add(mv.clone().mul(mv))
        .add(mw.clone().mul(mw))
        .div(rho)
        .mul_scalar(0.5)
}
